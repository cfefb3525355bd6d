//! Blocking iterator over component notifications
//!
//! A `ChangeIterator` registers a listener that forwards every event into a
//! `std::sync::mpsc` channel, for consumers that prefer pulling events on
//! their own thread over running code inside the dispatch loop:
//! - Blocking: `recv()`, `for event in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`
//!
//! Dropping the iterator removes its listener.

use std::sync::{mpsc, Arc, Weak};
use std::time::Duration;

use crate::emitter::{EventEmitter, ListenerId};

/// Blocking iterator over events from one notification channel
///
/// # Example
///
/// ```rust,ignore
/// let changes = component.field_changes();
///
/// // Non-blocking drain
/// for event in changes.try_iter() {
///     println!("{} changed to {}", event.field, event.new_value);
/// }
///
/// // With timeout
/// if let Some(event) = changes.recv_timeout(Duration::from_secs(1)) {
///     println!("Got event: {:?}", event);
/// }
/// ```
pub struct ChangeIterator<E> {
    rx: mpsc::Receiver<E>,
    listener: ListenerId,
    emitter: Weak<EventEmitter<E>>,
}

impl<E> ChangeIterator<E>
where
    E: Clone + Send + 'static,
{
    /// Subscribe to `emitter` and buffer its events
    pub(crate) fn subscribe(emitter: &Arc<EventEmitter<E>>) -> Self {
        let (tx, rx) = mpsc::channel();
        let listener = emitter.add_listener(move |event: &E| {
            // Receiver gone means the iterator is being dropped
            let _ = tx.send(event.clone());
        });

        Self {
            rx,
            listener,
            emitter: Arc::downgrade(emitter),
        }
    }
}

impl<E> ChangeIterator<E> {
    /// Block until the next event is available
    ///
    /// Returns `None` if the component has been dropped.
    pub fn recv(&self) -> Option<E> {
        self.rx.recv().ok()
    }

    /// Block until the next event or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<E> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<E> {
        self.rx.try_recv().ok()
    }

    /// Iterate over the events already buffered, without blocking
    pub fn try_iter(&self) -> TryIter<'_, E> {
        TryIter { inner: self }
    }

    /// Iterate, waiting up to `timeout` for each event
    ///
    /// Stops at the first timeout.
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, E> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl<E> Iterator for ChangeIterator<E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<E> Drop for ChangeIterator<E> {
    fn drop(&mut self) {
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.remove_listener(self.listener);
        }
    }
}

/// Non-blocking iterator over currently buffered events
pub struct TryIter<'a, E> {
    inner: &'a ChangeIterator<E>,
}

impl<'a, E> Iterator for TryIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with timeout
pub struct TimeoutIter<'a, E> {
    inner: &'a ChangeIterator<E>,
    timeout: Duration,
}

impl<'a, E> Iterator for TimeoutIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}
