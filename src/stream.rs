//! Current-value streams and event multicast.
//!
//! [`ValueStream`] is the behavior-subject primitive behind the live
//! fields of an activated route: one current value, many subscribers, and
//! a single writer (the scheduler) that pushes a new value only when the
//! relevant inequality check holds. Subscribers receive values over
//! `may` channels so a consumer coroutine can block on changes.

use may::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};

struct StreamInner<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

/// A current-value stream: holds the latest value and replays it to every
/// new subscriber before delivering subsequent pushes.
pub struct ValueStream<T: Clone> {
    inner: Arc<RwLock<StreamInner<T>>>,
}

impl<T: Clone> Clone for ValueStream<T> {
    fn clone(&self) -> Self {
        ValueStream {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for ValueStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("stream lock poisoned");
        f.debug_struct("ValueStream")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone> ValueStream<T> {
    pub fn new(initial: T) -> Self {
        ValueStream {
            inner: Arc::new(RwLock::new(StreamInner {
                value: initial,
                subscribers: Vec::new(),
            })),
        }
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.read().expect("stream lock poisoned").value.clone()
    }

    /// Subscribe to the stream. The current value is delivered
    /// immediately, then every subsequent push.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.write().expect("stream lock poisoned");
        // Delivery of the current value cannot fail: we still hold rx.
        let _ = tx.send(inner.value.clone());
        inner.subscribers.push(tx);
        rx
    }

    /// Replace the current value and fan it out. Subscribers whose
    /// receiver was dropped are pruned.
    pub(crate) fn next(&self, value: T) {
        let mut inner = self.inner.write().expect("stream lock poisoned");
        inner.value = value.clone();
        inner
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
    }
}

/// Single-writer, many-reader event fan-out without a current value.
/// The scheduler is the only writer.
pub(crate) struct Multicast<T: Clone> {
    subscribers: RwLock<Vec<Sender<T>>>,
}

impl<T: Clone> Multicast<T> {
    pub(crate) fn new() -> Self {
        Multicast {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .write()
            .expect("multicast lock poisoned")
            .push(tx);
        rx
    }

    pub(crate) fn emit(&self, value: T) {
        self.subscribers
            .write()
            .expect("multicast lock poisoned")
            .retain(|tx| tx.send(value.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_replays_current_value() {
        let stream = ValueStream::new(1);
        let rx = stream.subscribe();
        assert_eq!(rx.recv().unwrap(), 1);
        stream.next(2);
        assert_eq!(rx.recv().unwrap(), 2);
        assert_eq!(stream.get(), 2);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let stream = ValueStream::new("a".to_string());
        let rx = stream.subscribe();
        drop(rx);
        stream.next("b".to_string());
        let rx2 = stream.subscribe();
        assert_eq!(rx2.recv().unwrap(), "b");
    }

    #[test]
    fn test_multicast_delivers_to_all() {
        let hub = Multicast::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        hub.emit(7u32);
        assert_eq!(a.recv().unwrap(), 7);
        assert_eq!(b.recv().unwrap(), 7);
    }
}
