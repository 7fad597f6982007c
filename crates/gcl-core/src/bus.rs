//! Minimal publish/subscribe bus with persistent and one-shot listeners.
//!
//! Persistent listeners see every emitted value, in subscription order.
//! One-shot listeners see exactly the next emitted value; all of them are
//! unsubscribed before any callback of that emission runs, so a listener that
//! subscribes from inside a callback waits for the following emission.
//!
//! Callbacks are invoked outside the internal lock and may freely subscribe,
//! unsubscribe or emit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Handle returned by every subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type PersistentListener<T> = Arc<dyn Fn(&T) + Send + Sync>;
type OneShotListener<T> = Box<dyn FnOnce(T) + Send>;

struct Listeners<T> {
    next_id: u64,
    persistent: Vec<(ListenerId, PersistentListener<T>)>,
    one_shot: Vec<(ListenerId, OneShotListener<T>)>,
}

impl<T> Listeners<T> {
    const fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Event bus delivering cloned values to registered listeners.
pub struct EventBus<T> {
    listeners: Mutex<Listeners<T>>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Listeners {
                next_id: 0,
                persistent: Vec::new(),
                one_shot: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Listeners<T>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener that receives every value until removed with [`off`](Self::off).
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut listeners = self.lock();
        let id = listeners.allocate_id();
        listeners.persistent.push((id, Arc::new(listener)));
        id
    }

    /// Register a callback for the next emitted value only.
    pub fn once_with<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce(T) + Send + 'static,
    {
        let mut listeners = self.lock();
        let id = listeners.allocate_id();
        listeners.one_shot.push((id, Box::new(listener)));
        id
    }

    /// Register a one-shot listener and get the next value as a future.
    ///
    /// The receiver resolves with an error if the listener is removed with
    /// [`off`](Self::off) or the bus is dropped before anything is emitted.
    pub fn once(&self) -> (ListenerId, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let id = self.once_with(move |value| {
            // The waiter may have given up already.
            let _ = tx.send(value);
        });
        (id, rx)
    }

    /// Remove a listener of either kind. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.persistent.len() + listeners.one_shot.len();
        listeners.persistent.retain(|(existing, _)| *existing != id);
        listeners.one_shot.retain(|(existing, _)| *existing != id);
        before != listeners.persistent.len() + listeners.one_shot.len()
    }

    /// Deliver a value to all listeners. Returns how many listeners were invoked.
    pub fn emit(&self, value: T) -> usize {
        let (persistent, one_shot) = {
            let mut listeners = self.lock();
            let persistent: Vec<_> = listeners
                .persistent
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (persistent, std::mem::take(&mut listeners.one_shot))
        };

        for listener in &persistent {
            listener(&value);
        }
        let delivered = persistent.len() + one_shot.len();
        for (_, listener) in one_shot {
            listener(value.clone());
        }
        delivered
    }

    /// Deliver a value to persistent listeners only, leaving one-shot
    /// listeners waiting for the next [`emit`](Self::emit).
    pub fn emit_persistent(&self, value: &T) -> usize {
        let persistent: Vec<_> = self
            .lock()
            .persistent
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &persistent {
            listener(value);
        }
        persistent.len()
    }

    /// Number of currently registered listeners of both kinds.
    pub fn listener_count(&self) -> usize {
        let listeners = self.lock();
        listeners.persistent.len() + listeners.one_shot.len()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventBus")
            .field("persistent", &listeners.persistent.len())
            .field("one_shot", &listeners.one_shot.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, EventBus<u32>) {
        (Arc::new(Mutex::new(Vec::new())), EventBus::new())
    }

    #[test]
    fn test_persistent_listeners_fire_in_subscription_order() {
        let (log, bus) = recorder();
        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.on(move |v| log.lock().unwrap().push(format!("{name}:{v}")));
        }

        assert_eq!(bus.emit(1), 3);
        assert_eq!(bus.emit(2), 3);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:1", "second:1", "third:1", "first:2", "second:2", "third:2"]
        );
    }

    #[test]
    fn test_once_listener_receives_only_next_value() {
        let (log, bus) = recorder();
        let sink = Arc::clone(&log);
        bus.once_with(move |v| sink.lock().unwrap().push(v.to_string()));

        assert_eq!(bus.listener_count(), 1);
        bus.emit(7);
        assert_eq!(bus.listener_count(), 0);
        bus.emit(8);

        assert_eq!(*log.lock().unwrap(), vec!["7"]);
    }

    #[test]
    fn test_once_subscribed_during_emission_waits_for_next() {
        let bus = Arc::new(EventBus::<u32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::clone(&bus);
        let inner_seen = Arc::clone(&seen);
        bus.once_with(move |_| {
            let seen = Arc::clone(&inner_seen);
            inner_bus.once_with(move |v| seen.lock().unwrap().push(v));
        });

        bus.emit(1);
        assert!(seen.lock().unwrap().is_empty());
        bus.emit(2);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_off_removes_listener() {
        let (log, bus) = recorder();
        let sink = Arc::clone(&log);
        let id = bus.on(move |v| sink.lock().unwrap().push(v.to_string()));

        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.emit(3), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_emit_persistent_skips_one_shot_listeners() {
        let (log, bus) = recorder();
        let sink = Arc::clone(&log);
        bus.on(move |v| sink.lock().unwrap().push(format!("on:{v}")));
        let sink = Arc::clone(&log);
        bus.once_with(move |v| sink.lock().unwrap().push(format!("once:{v}")));

        assert_eq!(bus.emit_persistent(&1), 1);
        assert_eq!(bus.listener_count(), 2);
        assert_eq!(bus.emit(2), 2);

        assert_eq!(*log.lock().unwrap(), vec!["on:1", "on:2", "once:2"]);
    }

    #[tokio::test]
    async fn test_once_future_resolves_with_next_value() {
        let bus = EventBus::<u32>::new();
        let (_, rx) = bus.once();
        bus.emit(42);
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_once_future_errors_when_unsubscribed() {
        let bus = EventBus::<u32>::new();
        let (id, rx) = bus.once();
        assert!(bus.off(id));
        assert!(rx.await.is_err());
    }
}
