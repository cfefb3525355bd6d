//! Notification payloads
//!
//! Every `update` raises one `StateChangeEvent` on the `statechange`
//! channel, then one `FieldChangeEvent` on the `change` channel for each
//! field whose value actually changed.

use std::time::Instant;

use serde_json::Value;

use crate::id::ComponentId;
use crate::state::{FieldDiff, State};

/// Name of the coarse notification channel
pub const STATE_CHANGE: &str = "statechange";

/// Name of the per-field notification channel
pub const CHANGE: &str = "change";

/// Raised once per `update` with the merged and previous snapshots
///
/// Both snapshots are copies; listeners may keep or mutate them freely.
#[derive(Debug, Clone)]
pub struct StateChangeEvent {
    /// The component that was updated
    pub component: ComponentId,

    /// Snapshot after the merge
    pub new_state: State,

    /// Snapshot before the merge, `None` if the component had no state yet
    pub old_state: Option<State>,

    /// When the update was applied
    pub timestamp: Instant,
}

impl StateChangeEvent {
    /// Create a new state change event
    pub fn new(component: ComponentId, new_state: State, old_state: Option<State>) -> Self {
        Self {
            component,
            new_state,
            old_state,
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for StateChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.component == other.component
            && self.new_state == other.new_state
            && self.old_state == other.old_state
    }
}

/// Raised for each updated field whose value changed
#[derive(Debug, Clone)]
pub struct FieldChangeEvent {
    /// The component that was updated
    pub component: ComponentId,

    /// Name of the changed field
    pub field: String,

    /// Value after the merge
    pub new_value: Value,

    /// Value before the merge, `None` if the field is new
    pub old_value: Option<Value>,

    /// When the update was applied
    pub timestamp: Instant,
}

impl FieldChangeEvent {
    /// Create a new field change event
    pub fn new(
        component: ComponentId,
        field: impl Into<String>,
        new_value: Value,
        old_value: Option<Value>,
    ) -> Self {
        Self {
            component,
            field: field.into(),
            new_value,
            old_value,
            timestamp: Instant::now(),
        }
    }

    pub(crate) fn from_diff(component: ComponentId, diff: FieldDiff) -> Self {
        Self::new(component, diff.field, diff.new_value, diff.old_value)
    }
}

impl PartialEq for FieldChangeEvent {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
            && self.field == other.field
            && self.new_value == other.new_value
            && self.old_value == other.old_value
    }
}
