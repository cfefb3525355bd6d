//! Ordered publish/subscribe for a single notification channel
//!
//! `EventEmitter<E>` keeps its listeners in registration order and calls
//! them synchronously from `emit`. The listener list is copied before
//! dispatch, so a listener may add or remove listeners, or trigger another
//! emit on the same channel, without deadlocking. Changes to the list made
//! during dispatch apply from the next `emit`.
//!
//! # Failure isolation
//!
//! A listener that returns `Err` or panics is logged at `warn` level and
//! skipped; the remaining listeners still receive the event. The returned
//! `DispatchReport` says how many listeners failed.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{trace, warn};

/// Error type returned by fallible listeners
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of fallible listeners
pub type ListenerResult = std::result::Result<(), ListenerError>;

type Listener<E> = Arc<dyn Fn(&E) -> ListenerResult + Send + Sync>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle for removing a registered listener
///
/// Ids are unique across all emitters in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Outcome of a single `emit`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that returned normally
    pub delivered: usize,
    /// Listeners that returned an error or panicked
    pub failed: usize,
}

impl DispatchReport {
    /// Whether every listener succeeded
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Listener registry for one named channel
pub struct EventEmitter<E> {
    channel: &'static str,
    listeners: RwLock<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> EventEmitter<E> {
    /// Create an emitter with no listeners
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Channel name used in log output
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    /// Register a listener that cannot fail
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.try_add_listener(move |event| {
            listener(event);
            Ok(())
        })
    }

    /// Register a listener that may return an error
    pub fn try_add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) -> ListenerResult + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        let listener: Listener<E> = Arc::new(listener);
        self.listeners.write().push((id, listener));
        trace!(channel = self.channel, listener = %id, "Listener added");
        id
    }

    /// Remove a listener, returning whether it was registered here
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;

        if removed {
            trace!(channel = self.channel, listener = %id, "Listener removed");
        }
        removed
    }

    /// Check if a listener is registered here
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.read().iter().any(|(existing, _)| *existing == id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver `event` to every listener in registration order
    pub fn emit(&self, event: &E) -> DispatchReport {
        let listeners: Vec<(ListenerId, Listener<E>)> = self
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut report = DispatchReport::default();

        for (id, listener) in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!(
                        channel = self.channel,
                        listener = %id,
                        error = %err,
                        "Listener failed, continuing dispatch"
                    );
                }
                Err(payload) => {
                    report.failed += 1;
                    warn!(
                        channel = self.channel,
                        listener = %id,
                        panic = panic_message(payload.as_ref()),
                        "Listener panicked, continuing dispatch"
                    );
                }
            }
        }

        trace!(
            channel = self.channel,
            delivered = report.delivered,
            failed = report.failed,
            "Event dispatched"
        );
        report
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("channel", &self.channel)
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let emitter = EventEmitter::<u32>::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            emitter.add_listener(move |value| seen.lock().push((tag, *value)));
        }

        let report = emitter.emit(&7);

        assert_eq!(report, DispatchReport { delivered: 3, failed: 0 });
        assert_eq!(*seen.lock(), vec![("first", 7), ("second", 7), ("third", 7)]);
    }

    #[test]
    fn test_remove_listener() {
        let emitter = EventEmitter::<u32>::new("test");
        let calls = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&calls);
        let id = emitter.add_listener(move |_| *counter.lock() += 1);
        assert!(emitter.contains(id));

        emitter.emit(&1);
        assert!(emitter.remove_listener(id));
        assert!(!emitter.remove_listener(id));
        emitter.emit(&2);

        assert_eq!(*calls.lock(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_failing_listener_does_not_stop_dispatch() {
        let emitter = EventEmitter::<u32>::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));

        emitter.try_add_listener(|_| Err("listener rejected event".into()));
        emitter.add_listener(|_| panic!("listener blew up"));
        let sink = Arc::clone(&seen);
        emitter.add_listener(move |value| sink.lock().push(*value));

        let report = emitter.emit(&42);

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 2);
        assert!(!report.is_clean());
        assert_eq!(*seen.lock(), vec![42]);
    }

    #[test]
    fn test_listener_added_during_dispatch_applies_next_emit() {
        let emitter = Arc::new(EventEmitter::<u32>::new("test"));
        let late_calls = Arc::new(Mutex::new(0));

        let inner = Arc::clone(&emitter);
        let counter = Arc::clone(&late_calls);
        emitter.add_listener(move |_| {
            let counter = Arc::clone(&counter);
            inner.add_listener(move |_| *counter.lock() += 1);
        });

        emitter.emit(&1);
        assert_eq!(*late_calls.lock(), 0);

        emitter.emit(&2);
        assert_eq!(*late_calls.lock(), 1);
    }

    #[test]
    fn test_listener_ids_are_unique_across_emitters() {
        let a = EventEmitter::<u32>::new("a");
        let b = EventEmitter::<u32>::new("b");

        let id_a = a.add_listener(|_| {});
        let id_b = b.add_listener(|_| {});

        assert_ne!(id_a, id_b);
        assert!(!b.remove_listener(id_a));
        assert!(a.remove_listener(id_a));
    }
}
