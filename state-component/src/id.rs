//! Process-unique component identity

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity assigned to every `StateComponent` at construction
///
/// Ids increase monotonically for the life of the process and are never
/// reused. They label events and log output; they are not a handle to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub(crate) fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let first = ComponentId::next();
        let second = ComponentId::next();
        let third = ComponentId::next();

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_display() {
        let id = ComponentId(7);
        assert_eq!(id.to_string(), "component-7");
        assert_eq!(id.as_u64(), 7);
    }
}
