use projectboard_core::db::open_db_in_memory;
use projectboard_core::{
    bind_reconnect_sync, ConnectivityObserver, CreateOutcome, ProjectDraft, ProjectStore,
    SqliteSlotStore,
};
use std::sync::{Arc, Mutex};

#[test]
fn transition_to_online_drains_queue() {
    let store = shared_store(ConnectivityObserver::new());
    bind_reconnect_sync(&store);

    store.create(ProjectDraft::new("A"));
    store.create(ProjectDraft::new("B"));
    assert_eq!(store.list().len(), 5);

    store.connectivity().report(true);

    let listed = store.list();
    assert_eq!(listed.len(), 7);
    assert_eq!(listed[0].id, 7);
    assert_eq!(listed[1].id, 6);
    assert_eq!(store.pending_count(), 0);
}

#[test]
fn every_reconnect_triggers_a_new_drain() {
    let store = shared_store(ConnectivityObserver::with_initial(false));
    bind_reconnect_sync(&store);

    store.create(ProjectDraft::new("first outage"));
    store.connectivity().report(true);
    assert_eq!(store.list().len(), 6);

    store.connectivity().report(false);
    store.create(ProjectDraft::new("second outage"));
    assert_eq!(store.pending_count(), 1);
    store.connectivity().report(true);

    assert_eq!(store.list().len(), 7);
    assert_eq!(store.list()[0].title, "second outage");
}

#[test]
fn bind_while_online_drains_persisted_queue_immediately() {
    let slots = SqliteSlotStore::new(open_db_in_memory().unwrap());
    let observer = Arc::new(ConnectivityObserver::with_initial(false));
    let store = Arc::new(ProjectStore::open(slots, Arc::clone(&observer)));
    store.create(ProjectDraft::new("queued before bind"));

    // Reported before the binding exists, so nothing drains yet.
    observer.report(true);
    assert_eq!(store.pending_count(), 1);

    bind_reconnect_sync(&store);
    assert_eq!(store.pending_count(), 0);
    assert_eq!(store.list()[0].id, 6);
}

#[test]
fn going_offline_does_not_drain_and_creates_queue() {
    let store = shared_store(ConnectivityObserver::with_initial(true));
    bind_reconnect_sync(&store);

    store.connectivity().report(false);
    let outcome = store.create(ProjectDraft::new("offline"));

    assert_eq!(outcome, CreateOutcome::Queued { pending: 1 });
    assert_eq!(store.list().len(), 5);
}

#[test]
fn unsubscribing_stops_automatic_sync() {
    let store = shared_store(ConnectivityObserver::new());
    let subscription = bind_reconnect_sync(&store);
    assert!(store.connectivity().unsubscribe(subscription));

    store.create(ProjectDraft::new("stays queued"));
    store.connectivity().report(true);

    assert_eq!(store.pending_count(), 1);
}

#[test]
fn reconnect_during_drain_notification_is_drained_afterwards() {
    let store = shared_store(ConnectivityObserver::with_initial(false));
    bind_reconnect_sync(&store);
    store.create(ProjectDraft::new("A"));

    let weak = Arc::downgrade(&store);
    let fired = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&fired);
    store.subscribe(move |projects| {
        let mut fired = flag.lock().unwrap();
        if *fired || projects.len() != 6 {
            return;
        }
        *fired = true;
        drop(fired);
        // A short outage while the first drain is still notifying.
        if let Some(store) = weak.upgrade() {
            store.connectivity().report(false);
            store.create(ProjectDraft::new("B"));
            store.connectivity().report(true);
        }
    });

    store.connectivity().report(true);

    assert!(*fired.lock().unwrap());
    assert_eq!(store.pending_count(), 0);
    let listed = store.list();
    assert_eq!(listed.len(), 7);
    assert_eq!((listed[0].id, listed[0].title.as_str()), (7, "B"));
}

fn shared_store(observer: ConnectivityObserver) -> Arc<ProjectStore<SqliteSlotStore>> {
    let slots = SqliteSlotStore::new(open_db_in_memory().unwrap());
    Arc::new(ProjectStore::open(slots, Arc::new(observer)))
}
