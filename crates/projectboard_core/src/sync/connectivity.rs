//! Network reachability signal.
//!
//! # Responsibility
//! - Hold the latest "network reachable" value pushed by the platform.
//! - Notify subscribers when the effective value changes.
//!
//! # Invariants
//! - Unknown state (nothing reported yet) reads as offline.
//! - Listeners run outside the internal locks, so they may call back in.
//! - Repeating the current value does not notify.

use crate::sync::listeners::{ListenerSet, SubscriptionId};
use log::info;
use std::sync::RwLock;

/// Live online/offline signal with change subscribers.
#[derive(Default)]
pub struct ConnectivityObserver {
    reachable: RwLock<Option<bool>>,
    listeners: ListenerSet<bool>,
}

impl ConnectivityObserver {
    /// Creates an observer in the unknown (offline) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an observer that already knows the current value.
    pub fn with_initial(reachable: bool) -> Self {
        Self {
            reachable: RwLock::new(Some(reachable)),
            listeners: ListenerSet::default(),
        }
    }

    /// Returns whether the network is reachable. Unknown reads as `false`.
    pub fn is_reachable(&self) -> bool {
        self.raw().unwrap_or(false)
    }

    /// Returns the raw state, `None` while nothing has been reported.
    pub fn raw(&self) -> Option<bool> {
        *self
            .reachable
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the latest platform value and notifies on change.
    ///
    /// The first report always counts as a change, even `false`.
    /// Returns `true` when subscribers were notified.
    pub fn report(&self, reachable: bool) -> bool {
        let previous = self
            .reachable
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(reachable);

        if previous == Some(reachable) {
            return false;
        }

        info!(
            "event=network_change module=sync status=ok reachable={} previous={}",
            reachable,
            previous.map_or("unknown", |value| if value { "true" } else { "false" })
        );
        self.listeners.notify(&reachable);
        true
    }

    /// Registers a change listener.
    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        self.listeners.subscribe(move |value: &bool| listener(*value))
    }

    /// Removes a listener. Returns `false` when the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectivityObserver;
    use std::sync::{Arc, Mutex};

    #[test]
    fn unknown_state_reads_as_offline() {
        let observer = ConnectivityObserver::new();
        assert_eq!(observer.raw(), None);
        assert!(!observer.is_reachable());
    }

    #[test]
    fn notifies_only_on_change() {
        let observer = ConnectivityObserver::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        observer.subscribe(move |value| sink.lock().unwrap().push(value));

        assert!(observer.report(false));
        assert!(!observer.report(false));
        assert!(observer.report(true));
        assert!(!observer.report(true));
        assert!(observer.report(false));

        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let observer = ConnectivityObserver::with_initial(false);
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let id = observer.subscribe(move |_| *sink.lock().unwrap() += 1);

        assert!(observer.unsubscribe(id));
        assert!(!observer.unsubscribe(id));
        observer.report(true);
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn listener_may_read_observer_reentrantly() {
        let observer = Arc::new(ConnectivityObserver::new());
        let seen = Arc::new(Mutex::new(None));
        let (inner, sink) = (Arc::downgrade(&observer), Arc::clone(&seen));
        observer.subscribe(move |_| {
            if let Some(inner) = inner.upgrade() {
                *sink.lock().unwrap() = Some(inner.is_reachable());
            }
        });

        observer.report(true);
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }
}
