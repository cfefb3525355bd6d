//! Stateful Components
//!
//! A small primitive for server-side, event-driven components (chat rooms,
//! device proxies, pollers): a private state snapshot that can only change
//! through merged partial updates, with notifications on every change.
//!
//! # Features
//!
//! - **Private State**: Reads return copies; there is no mutable accessor
//! - **Shallow Merge**: Updates overwrite top-level fields and keep the rest
//! - **Change Detection**: One `statechange` per update, one `change` per
//!   field whose value actually differs
//! - **Isolated Listeners**: A failing listener never blocks the others
//! - **Polling Support**: `wait` suspends a tokio task between polls
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use state_component::StateComponent;
//!
//! let room = StateComponent::with_state(
//!     json!({"topic": "general", "members": 2}).as_object().cloned().unwrap(),
//! );
//!
//! room.on_state_change(|event| {
//!     println!("{:?} -> {:?}", event.old_state, event.new_state);
//! });
//! room.on_change(|event| {
//!     println!("{}: {:?} -> {}", event.field, event.old_value, event.new_value);
//! });
//!
//! room.update(json!({"members": 3})).unwrap();
//!
//! let state = room.state().unwrap();
//! assert_eq!(state["topic"], json!("general"));
//! assert_eq!(state["members"], json!(3));
//! ```
//!
//! # Architecture
//!
//! ```text
//! StateComponent
//!     │
//!     ├── id: ComponentId                     (process-unique, monotonic)
//!     │
//!     ├── state: RwLock<Option<State>>        (private, copied on read)
//!     │
//!     ├── state_changes: EventEmitter<StateChangeEvent>   "statechange"
//!     │
//!     └── field_changes: EventEmitter<FieldChangeEvent>   "change"
//!             │
//!             └── ChangeIterator<E>           (optional pull-based consumer)
//! ```

// Modules
pub mod component;
pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod id;
pub mod iter;
pub mod logging;
pub mod state;
pub mod timer;

// Re-exports - Public API
pub use component::{StateComponent, Stateful};
pub use config::ComponentConfig;
pub use emitter::{DispatchReport, EventEmitter, ListenerError, ListenerId, ListenerResult};
pub use error::{ComponentError, Result};
pub use event::{FieldChangeEvent, StateChangeEvent, CHANGE, STATE_CHANGE};
pub use id::ComponentId;
pub use iter::{ChangeIterator, TimeoutIter, TryIter};
pub use state::State;
pub use timer::wait;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::component::{StateComponent, Stateful};
    pub use crate::config::ComponentConfig;
    pub use crate::error::{ComponentError, Result};
    pub use crate::event::{FieldChangeEvent, StateChangeEvent};
    pub use crate::state::State;
}
