//! Construction-time configuration
//!
//! `ComponentConfig` is the hook through which a collaborator supplies a
//! component's initial state. It is read once, when the component is built.
//!
//! ```rust
//! use state_component::{ComponentConfig, StateComponent};
//!
//! let config = ComponentConfig::from_json_str(
//!     r#"{ "name": "lobby", "initial_state": { "topic": "general", "members": [] } }"#,
//! ).unwrap();
//!
//! let room = StateComponent::from_config(config);
//! assert_eq!(room.name(), "lobby");
//! assert_eq!(room.get("topic"), Some(serde_json::json!("general")));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ComponentError, Result};
use crate::state::{json_type_name, State};

/// Initial configuration for a `StateComponent`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Label used in log output; defaults to the component id
    pub name: Option<String>,

    /// State the component starts with; `None` leaves it uninitialized
    pub initial_state: Option<State>,
}

impl ComponentConfig {
    /// Empty configuration: no name, no initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the component name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the initial state
    pub fn with_initial_state(mut self, state: State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Parse a configuration from JSON text
    ///
    /// The document must be an object, and `initial_state`, when present,
    /// must be an object or `null`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)?;

        if !raw.is_object() {
            return Err(ComponentError::Config(format!(
                "configuration must be an object, found {}",
                json_type_name(&raw)
            )));
        }

        if let Some(initial) = raw.get("initial_state") {
            if !initial.is_object() && !initial.is_null() {
                return Err(ComponentError::Config(format!(
                    "initial_state must be an object, found {}",
                    json_type_name(initial)
                )));
            }
        }

        Ok(serde_json::from_value(raw)?)
    }

    /// Read and parse a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
