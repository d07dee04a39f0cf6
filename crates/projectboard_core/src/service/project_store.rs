//! Project store with offline write queueing.
//!
//! # Responsibility
//! - Own the canonical project list and the pending-write queue.
//! - Commit creations immediately when online, queue them when offline.
//! - Replay queued creations on reconnect (`reconnect_sync`).
//! - Persist complete state to durable slots and notify subscribers.
//!
//! # Invariants
//! - Project ids are unique; new ids are `max(ids, 0) + 1` at commit time.
//! - Queued drafts get their ids only when drained, in enqueue order.
//! - The queue is drained whole or not at all.
//! - Slot failures are logged and never roll back in-memory state.
//! - Listeners are called with no internal lock held, in commit order, and
//!   always end on the current list.
//! - Reachability is read under the state lock, so a drain never misses a
//!   draft queued concurrently with the online transition.
//!
//! # See also
//! - docs/architecture/project-store.md

use crate::model::draft::ProjectDraft;
use crate::model::project::{
    next_project_id, Project, ProjectId, ProjectPatch, ProjectStatus, StatusCounts,
};
use crate::model::seed::seed_projects;
use crate::repo::slot_repo::{
    read_json, SlotError, SlotResult, SlotStore, SlotWrite, OFFLINE_PROJECTS_SLOT, PROJECTS_SLOT,
};
use crate::sync::connectivity::ConnectivityObserver;
use crate::sync::listeners::{ListenerSet, SubscriptionId};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Result of `ProjectStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Online: the project was assigned an id and prepended.
    Committed(Project),
    /// Offline: the draft was queued; `pending` is the new queue length.
    Queued { pending: usize },
    /// The list already holds `i64::MAX`; nothing changed.
    IdSpaceExhausted,
}

/// Result of update/delete calls. Unknown ids are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    NotFound,
}

/// Result of `ProjectStore::reconnect_sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Queue was empty; nothing changed.
    Idle,
    /// Queue drained; ids assigned in enqueue order.
    Drained { ids: Vec<ProjectId> },
    /// Another drain was in progress; it runs one more pass when done.
    AlreadyRunning,
    /// The queue does not fit below `i64::MAX`; nothing changed.
    IdSpaceExhausted,
}

#[derive(Debug)]
struct StoreState {
    projects: Vec<Project>,
    pending: Vec<ProjectDraft>,
    /// Bumped on every change to `projects`.
    version: u64,
}

/// Single owner of project state.
///
/// Shared as `Arc<ProjectStore<S>>`; every operation takes `&self`.
pub struct ProjectStore<S: SlotStore> {
    slots: S,
    connectivity: Arc<ConnectivityObserver>,
    state: Mutex<StoreState>,
    syncing: AtomicBool,
    sync_requested: AtomicBool,
    publishing: AtomicBool,
    delivered: AtomicU64,
    listeners: ListenerSet<[Project]>,
}

impl<S: SlotStore> ProjectStore<S> {
    /// Creates a store holding the seed list and an empty queue.
    ///
    /// Nothing is read from `slots` until `load()`.
    pub fn new(slots: S, connectivity: Arc<ConnectivityObserver>) -> Self {
        Self {
            slots,
            connectivity,
            state: Mutex::new(StoreState {
                projects: seed_projects(),
                pending: Vec::new(),
                version: 0,
            }),
            syncing: AtomicBool::new(false),
            sync_requested: AtomicBool::new(false),
            publishing: AtomicBool::new(false),
            delivered: AtomicU64::new(0),
            listeners: ListenerSet::default(),
        }
    }

    /// Creates a store and loads persisted state.
    pub fn open(slots: S, connectivity: Arc<ConnectivityObserver>) -> Self {
        let store = Self::new(slots, connectivity);
        store.load();
        store
    }

    /// Returns the connectivity signal this store consults on `create`.
    pub fn connectivity(&self) -> &Arc<ConnectivityObserver> {
        &self.connectivity
    }

    /// Reloads the canonical list and pending queue from durable slots.
    ///
    /// - Missing `projects` slot: seed list.
    /// - Unreadable or malformed slot: logged, current in-memory value kept.
    /// - Missing `offline_projects` slot: empty queue.
    pub fn load(&self) {
        let started_at = Instant::now();

        let projects = match read_projects(&self.slots) {
            Ok(Some(projects)) => Some((projects, "persisted")),
            Ok(None) => Some((seed_projects(), "seed")),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error slot={} error_code={} error={}",
                    PROJECTS_SLOT,
                    err.code(),
                    err
                );
                None
            }
        };
        let pending = match read_json::<Vec<ProjectDraft>>(&self.slots, OFFLINE_PROJECTS_SLOT) {
            Ok(pending) => Some(pending.unwrap_or_default()),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error slot={} error_code={} error={}",
                    OFFLINE_PROJECTS_SLOT,
                    err.code(),
                    err
                );
                None
            }
        };

        let (count, source, pending_count) = {
            let mut state = self.state();
            let source = match projects {
                Some((projects, source)) => {
                    state.projects = projects;
                    source
                }
                None => "memory",
            };
            if let Some(pending) = pending {
                state.pending = pending;
            }
            state.version += 1;
            (state.projects.len(), source, state.pending.len())
        };

        info!(
            "event=store_load module=store status=ok source={} count={} pending={} duration_ms={}",
            source,
            count,
            pending_count,
            started_at.elapsed().as_millis()
        );
        self.publish();
    }

    /// Returns the canonical list, most recently created first.
    pub fn list(&self) -> Vec<Project> {
        self.state().projects.clone()
    }

    /// Returns one project by id.
    pub fn get(&self, id: ProjectId) -> Option<Project> {
        self.state()
            .projects
            .iter()
            .find(|project| project.id == id)
            .cloned()
    }

    /// Returns the number of queued offline creations.
    pub fn pending_count(&self) -> usize {
        self.state().pending.len()
    }

    /// Returns per-status totals over the canonical list.
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_projects(&self.state().projects)
    }

    /// Creates a project, or queues it when offline.
    ///
    /// Online: assigns the next id, prepends, persists and notifies.
    /// Offline: leaves the list untouched and appends the draft, unmodified,
    /// to the durable queue. Subscribers are not notified.
    pub fn create(&self, draft: ProjectDraft) -> CreateOutcome {
        let mut state = self.state();
        if !self.connectivity.is_reachable() {
            state.pending.push(draft);
            self.persist(&state, "project_create");
            let pending = state.pending.len();
            drop(state);
            info!("event=project_create module=store status=queued pending={pending}");
            return CreateOutcome::Queued { pending };
        }

        let Some(id) = next_project_id(&state.projects) else {
            drop(state);
            error!(
                "event=project_create module=store status=error error_code=id_space_exhausted"
            );
            return CreateOutcome::IdSpaceExhausted;
        };
        let project = Project::from_draft(id, draft);
        state.projects.insert(0, project.clone());
        state.version += 1;
        self.persist(&state, "project_create");
        let count = state.projects.len();
        drop(state);

        info!(
            "event=project_create module=store status=ok id={} count={}",
            project.id, count
        );
        self.publish();
        CreateOutcome::Committed(project)
    }

    /// Replaces the status of one project.
    pub fn update_status(&self, id: ProjectId, status: ProjectStatus) -> WriteOutcome {
        self.modify("project_update", id, |projects| {
            let project = projects.iter_mut().find(|project| project.id == id)?;
            project.status = status;
            Some(())
        })
    }

    /// Shallow-merges `patch` into one project.
    pub fn update_fields(&self, id: ProjectId, patch: &ProjectPatch) -> WriteOutcome {
        self.modify("project_update", id, |projects| {
            let project = projects.iter_mut().find(|project| project.id == id)?;
            project.apply_patch(patch);
            Some(())
        })
    }

    /// Removes one project.
    pub fn delete(&self, id: ProjectId) -> WriteOutcome {
        self.modify("project_delete", id, |projects| {
            let index = projects.iter().position(|project| project.id == id)?;
            projects.remove(index);
            Some(())
        })
    }

    /// Merges the pending queue into the canonical list.
    ///
    /// Drafts are drained in enqueue order; each gets `max(ids, 0) + 1`
    /// against the list as it grows and is prepended, so the oldest draft
    /// ends up deepest among the new entries. The grown list and the
    /// cleared queue are written in one atomic slot batch.
    ///
    /// A call made while another drain runs returns `AlreadyRunning` and
    /// makes the running drain do one more pass once it finishes.
    pub fn reconnect_sync(&self) -> SyncOutcome {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.sync_requested.store(true, Ordering::Release);
            debug!("event=reconnect_sync module=store status=deferred reason=already_running");
            return SyncOutcome::AlreadyRunning;
        }

        let outcome = {
            let _guard = SyncGuard(&self.syncing);
            self.drain_pending()
        };

        if self.sync_requested.swap(false, Ordering::AcqRel) {
            let follow_up = self.reconnect_sync();
            debug!("event=reconnect_sync module=store status=follow_up outcome={follow_up:?}");
        }
        outcome
    }

    /// Registers a listener called with the new list after each change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[Project]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Removes a listener. Returns `false` when the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn drain_pending(&self) -> SyncOutcome {
        let started_at = Instant::now();

        let (ids, count) = {
            let mut state = self.state();
            if state.pending.is_empty() {
                return SyncOutcome::Idle;
            }

            // The whole queue must fit, or nothing is drained.
            let range = next_project_id(&state.projects).and_then(|first| {
                let extra = ProjectId::try_from(state.pending.len() - 1).ok()?;
                Some((first, first.checked_add(extra)?))
            });
            let Some((first, last)) = range else {
                let pending = state.pending.len();
                drop(state);
                error!(
                    "event=reconnect_sync module=store status=error error_code=id_space_exhausted pending={pending}"
                );
                return SyncOutcome::IdSpaceExhausted;
            };

            let queued = std::mem::take(&mut state.pending);
            let mut ids = Vec::with_capacity(queued.len());
            for (id, draft) in (first..=last).zip(queued) {
                state.projects.insert(0, Project::from_draft(id, draft));
                ids.push(id);
            }
            state.version += 1;
            self.persist(&state, "reconnect_sync");
            (ids, state.projects.len())
        };

        info!(
            "event=reconnect_sync module=store status=ok drained={} count={} duration_ms={}",
            ids.len(),
            count,
            started_at.elapsed().as_millis()
        );
        // Still guarded: a listener re-entering `reconnect_sync` is deferred.
        self.publish();
        SyncOutcome::Drained { ids }
    }

    fn modify(
        &self,
        event: &'static str,
        id: ProjectId,
        apply: impl FnOnce(&mut Vec<Project>) -> Option<()>,
    ) -> WriteOutcome {
        let count = {
            let mut state = self.state();
            if apply(&mut state.projects).is_none() {
                debug!("event={event} module=store status=not_found id={id}");
                return WriteOutcome::NotFound;
            }
            state.version += 1;
            self.persist(&state, event);
            state.projects.len()
        };
        info!("event={event} module=store status=ok id={id} count={count}");
        self.publish();
        WriteOutcome::Applied
    }

    /// Delivers the latest committed list to listeners.
    ///
    /// One caller pumps at a time. Concurrent or nested callers return at
    /// once and the active pump delivers their commit, so listeners see lists
    /// in commit order (intermediate versions may be coalesced).
    fn publish(&self) {
        loop {
            if self
                .publishing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            loop {
                let (version, snapshot) = {
                    let state = self.state();
                    if state.version == self.delivered.load(Ordering::Acquire) {
                        break;
                    }
                    (state.version, state.projects.clone())
                };
                self.delivered.store(version, Ordering::Release);
                self.listeners.notify(&snapshot);
            }
            self.publishing.store(false, Ordering::Release);

            // A commit that landed between the last check and the release.
            if self.state().version == self.delivered.load(Ordering::Acquire) {
                return;
            }
        }
    }

    /// Writes the full list and queue. Called with the state lock held, so
    /// persists never interleave.
    fn persist(&self, state: &StoreState, event: &'static str) {
        let result = encode_state(state).and_then(|writes| self.slots.write_batch(&writes));
        if let Err(err) = result {
            error!(
                "event=store_persist module=store status=error trigger={} error_code={} error={}",
                event,
                err.code(),
                err
            );
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct SyncGuard<'a>(&'a AtomicBool);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn encode_state(state: &StoreState) -> SlotResult<Vec<SlotWrite>> {
    let queue = if state.pending.is_empty() {
        SlotWrite::remove(OFFLINE_PROJECTS_SLOT)
    } else {
        SlotWrite::put_json(OFFLINE_PROJECTS_SLOT, &state.pending)?
    };
    Ok(vec![
        SlotWrite::put_json(PROJECTS_SLOT, &state.projects)?,
        queue,
    ])
}

/// Reads the persisted list, rejecting payloads that break id uniqueness.
fn read_projects(slots: &dyn SlotStore) -> Result<Option<Vec<Project>>, LoadError> {
    let Some(projects) = read_json::<Vec<Project>>(slots, PROJECTS_SLOT)? else {
        return Ok(None);
    };
    let mut seen = HashSet::with_capacity(projects.len());
    if let Some(duplicate) = projects.iter().find(|project| !seen.insert(project.id)) {
        return Err(LoadError::DuplicateId(duplicate.id));
    }
    Ok(Some(projects))
}

#[derive(Debug)]
enum LoadError {
    Slot(SlotError),
    DuplicateId(ProjectId),
}

impl LoadError {
    fn code(&self) -> &'static str {
        match self {
            Self::Slot(err) => err.code(),
            Self::DuplicateId(_) => "duplicate_project_id",
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "persisted project list repeats id {id}"),
        }
    }
}

impl From<SlotError> for LoadError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}
