//! Wiring between the connectivity signal and the project store.
//!
//! # Responsibility
//! - Run `reconnect_sync` on every transition to online.
//! - Run one sync at bind time when already online.
//!
//! # Invariants
//! - The observer holds only a weak handle to the store, so dropping the
//!   last store handle ends the binding.

use crate::repo::slot_repo::SlotStore;
use crate::service::project_store::ProjectStore;
use crate::sync::listeners::SubscriptionId;
use std::sync::Arc;

/// Subscribes `store` to its own connectivity observer.
///
/// Returns the observer subscription; pass it to
/// `ConnectivityObserver::unsubscribe` to stop automatic syncing.
pub fn bind_reconnect_sync<S>(store: &Arc<ProjectStore<S>>) -> SubscriptionId
where
    S: SlotStore + 'static,
{
    let observer = Arc::clone(store.connectivity());
    let weak = Arc::downgrade(store);
    let subscription = observer.subscribe(move |reachable| {
        if !reachable {
            return;
        }
        if let Some(store) = weak.upgrade() {
            store.reconnect_sync();
        }
    });

    if observer.is_reachable() {
        store.reconnect_sync();
    }
    subscription
}
