//! The state container
//!
//! `StateComponent` owns one state snapshot and two notification channels.
//! State can only be read as a copy and only changed through `update`, so
//! every mutation goes through the merge and notification path.
//!
//! # Update algorithm
//!
//! ```text
//! update(partial)
//!   ├── reject non-object values (InvalidUpdate, nothing emitted)
//!   ├── [write lock] old = current; new = merge(old, partial); current = new
//!   ├── emit statechange(new, old)
//!   └── for field in partial where new[field] != old[field]:
//!           emit change(field, new[field], old[field])
//! ```
//!
//! The lock is released before dispatch. Listeners may read state, register
//! listeners, or call `update` again; a nested `update` runs to completion
//! (including its own notifications) before the outer dispatch continues.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::ComponentConfig;
use crate::emitter::{EventEmitter, ListenerId, ListenerResult};
use crate::error::Result;
use crate::event::{FieldChangeEvent, StateChangeEvent, CHANGE, STATE_CHANGE};
use crate::id::ComponentId;
use crate::iter::ChangeIterator;
use crate::state::{self, State};
use crate::timer;

/// A component with private state and change notifications
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use state_component::StateComponent;
///
/// let device = StateComponent::with_state(
///     json!({"online": true, "battery": 80}).as_object().cloned().unwrap(),
/// );
///
/// device.on_field_change("battery", |event| {
///     println!("battery {:?} -> {}", event.old_value, event.new_value);
/// });
///
/// device.update(json!({"battery": 75})).unwrap();
///
/// assert_eq!(device.get("battery"), Some(json!(75)));
/// assert_eq!(device.get("online"), Some(json!(true)));
/// ```
pub struct StateComponent {
    id: ComponentId,
    name: String,
    state: RwLock<Option<State>>,
    state_changes: Arc<EventEmitter<StateChangeEvent>>,
    field_changes: Arc<EventEmitter<FieldChangeEvent>>,
}

impl StateComponent {
    /// Create a component, optionally with initial state
    pub fn new(initial: Option<State>) -> Self {
        let id = ComponentId::next();
        Self::build(id, id.to_string(), initial)
    }

    /// Create a component with no state yet
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Create a component with initial state
    pub fn with_state(initial: State) -> Self {
        Self::new(Some(initial))
    }

    /// Create a component from configuration
    pub fn from_config(config: ComponentConfig) -> Self {
        let id = ComponentId::next();
        let name = config.name.unwrap_or_else(|| id.to_string());
        Self::build(id, name, config.initial_state)
    }

    fn build(id: ComponentId, name: String, initial: Option<State>) -> Self {
        debug!(
            component = %id,
            name = %name,
            initialized = initial.is_some(),
            "Component created"
        );

        Self {
            id,
            name,
            state: RwLock::new(initial),
            state_changes: Arc::new(EventEmitter::new(STATE_CHANGE)),
            field_changes: Arc::new(EventEmitter::new(CHANGE)),
        }
    }

    /// This component's identity
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Name used in log output
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Reading state
    // ========================================================================

    /// Copy of the current snapshot, or `None` before any state exists
    ///
    /// Each call returns an independent copy; changing it has no effect on
    /// the component or on other readers.
    pub fn state(&self) -> Option<State> {
        self.state.read().clone()
    }

    /// Copy of a single field
    pub fn get(&self, field: &str) -> Option<Value> {
        self.state.read().as_ref()?.get(field).cloned()
    }

    /// Whether a snapshot has been stored
    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    // ========================================================================
    // Updating state
    // ========================================================================

    /// Merge `partial` into the current state and notify listeners
    ///
    /// `partial` must be a JSON object; anything else is rejected with
    /// `ComponentError::InvalidUpdate` before state is touched.
    pub fn update(&self, partial: Value) -> Result<()> {
        let partial = state::into_partial(partial).inspect_err(|err| {
            warn!(component = %self.id, name = %self.name, error = %err, "Rejected state update");
        })?;

        self.update_fields(partial);
        Ok(())
    }

    /// Merge an already-validated map into the current state
    pub fn update_fields(&self, partial: State) {
        let (new_state, old_state) = {
            let mut current = self.state.write();
            let old_state = current.take();
            let new_state = state::merge(old_state.as_ref(), &partial);
            *current = Some(new_state.clone());
            (new_state, old_state)
        };

        let changes = state::diff(&partial, old_state.as_ref(), &new_state);

        debug!(
            component = %self.id,
            name = %self.name,
            fields = partial.len(),
            changed = changes.len(),
            "State updated"
        );

        self.state_changes
            .emit(&StateChangeEvent::new(self.id, new_state, old_state));

        for change in changes {
            trace!(component = %self.id, field = %change.field, "Field changed");
            self.field_changes
                .emit(&FieldChangeEvent::from_diff(self.id, change));
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Listen on the `statechange` channel
    pub fn on_state_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StateChangeEvent) + Send + Sync + 'static,
    {
        self.state_changes.add_listener(listener)
    }

    /// Listen on the `statechange` channel with a fallible listener
    pub fn try_on_state_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StateChangeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.state_changes.try_add_listener(listener)
    }

    /// Listen on the `change` channel
    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&FieldChangeEvent) + Send + Sync + 'static,
    {
        self.field_changes.add_listener(listener)
    }

    /// Listen on the `change` channel with a fallible listener
    pub fn try_on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&FieldChangeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.field_changes.try_add_listener(listener)
    }

    /// Listen for changes to one field
    pub fn on_field_change<F>(&self, field: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&FieldChangeEvent) + Send + Sync + 'static,
    {
        let field = field.into();
        self.field_changes.add_listener(move |event| {
            if event.field == field {
                listener(event);
            }
        })
    }

    /// Remove a listener from whichever channel holds it
    pub fn off(&self, id: ListenerId) -> bool {
        self.state_changes.remove_listener(id) || self.field_changes.remove_listener(id)
    }

    /// Listeners registered on a channel (`"statechange"` or `"change"`)
    pub fn listener_count(&self, channel: &str) -> usize {
        match channel {
            STATE_CHANGE => self.state_changes.listener_count(),
            CHANGE => self.field_changes.listener_count(),
            _ => 0,
        }
    }

    /// Blocking iterator over `statechange` notifications
    pub fn state_changes(&self) -> ChangeIterator<StateChangeEvent> {
        ChangeIterator::subscribe(&self.state_changes)
    }

    /// Blocking iterator over `change` notifications
    pub fn field_changes(&self) -> ChangeIterator<FieldChangeEvent> {
        ChangeIterator::subscribe(&self.field_changes)
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Suspend the calling task for `duration`
    ///
    /// See [`timer::wait`].
    pub async fn wait(&self, duration: Duration) {
        trace!(component = %self.id, ?duration, "Waiting");
        timer::wait(duration).await;
    }
}

impl Default for StateComponent {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for StateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateComponent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .field("statechange_listeners", &self.state_changes.listener_count())
            .field("change_listeners", &self.field_changes.listener_count())
            .finish()
    }
}

/// Types built around an embedded `StateComponent`
///
/// Chat rooms, device proxies and pollers hold a `StateComponent` and
/// implement this trait to expose the read/update/wait contract directly.
///
/// ```rust
/// use serde_json::json;
/// use state_component::{StateComponent, Stateful};
///
/// struct Thermostat {
///     component: StateComponent,
/// }
///
/// impl Stateful for Thermostat {
///     fn component(&self) -> &StateComponent {
///         &self.component
///     }
/// }
///
/// let thermostat = Thermostat { component: StateComponent::empty() };
/// thermostat.set_state(json!({"target": 21})).unwrap();
/// assert_eq!(thermostat.state().unwrap()["target"], json!(21));
/// ```
pub trait Stateful {
    /// The embedded component
    fn component(&self) -> &StateComponent;

    /// Copy of the current state
    fn state(&self) -> Option<State> {
        self.component().state()
    }

    /// Merge a partial update into the state
    fn set_state(&self, partial: Value) -> Result<()> {
        self.component().update(partial)
    }

    /// Suspend the calling task for `duration`
    fn wait(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        timer::wait(duration)
    }
}
