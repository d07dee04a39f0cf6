//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose project store use-cases to Dart via FRB.
//! - Own the process-wide store and connectivity signal.
//! - Map core types to flat, string-friendly DTOs.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store calls are async bridge calls (run off the UI thread by FRB).
//! - All project writes go through the core store.

use log::{info, warn};
use projectboard_core::db::open_db;
use projectboard_core::{
    bind_reconnect_sync, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, total_hours_label, ConnectivityObserver, CreateOutcome, IconType,
    Project, ProjectDraft, ProjectPatch, ProjectStatus, ProjectStore, SqliteSlotStore,
    SyncOutcome, TeamMember, WriteOutcome,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

const STORE_DB_FILE_NAME: &str = "projectboard.sqlite3";
const STORE_DB_PATH_ENV: &str = "PROJECTBOARD_DB_PATH";

static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE: OnceLock<Arc<ProjectStore<SqliteSlotStore>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Team member as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMemberItem {
    pub name: String,
    pub color_index: i64,
}

/// Project card/detail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub description: String,
    pub hours: String,
    pub team_members: Vec<TeamMemberItem>,
    /// `fintech|website|mobile|design`.
    pub icon_type: String,
    pub background_color: String,
    /// `active|completed|on-hold`.
    pub status: String,
}

/// Input of the create-project form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCreateRequest {
    pub title: String,
    pub description: String,
    pub date: String,
    /// Per-task hour labels such as `12 hr`; summed into the project `hours`.
    pub task_hours: Vec<String>,
    pub team_members: Vec<TeamMemberItem>,
    pub icon_type: String,
    pub background_color: String,
}

/// Partial project update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatchRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub hours: Option<String>,
    pub team_members: Option<Vec<TeamMemberItem>>,
    pub icon_type: Option<String>,
    pub background_color: Option<String>,
    pub status: Option<String>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListResponse {
    pub ok: bool,
    /// Most recently created first.
    pub items: Vec<ProjectItem>,
    pub message: String,
}

/// Generic write response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectActionResponse {
    /// Whether the call was accepted. Unknown ids are accepted no-ops.
    pub ok: bool,
    /// Assigned id for committed creates, or the target id for updates.
    pub project_id: Option<i64>,
    /// `true` when a create was queued for reconnect-sync.
    pub queued: bool,
    /// Queue length after the call.
    pub pending_count: u32,
    pub message: String,
}

impl ProjectActionResponse {
    fn success(message: impl Into<String>, project_id: Option<i64>, pending_count: usize) -> Self {
        Self {
            ok: true,
            project_id,
            queued: false,
            pending_count: clamp_count(pending_count),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            project_id: None,
            queued: false,
            pending_count: 0,
            message: message.into(),
        }
    }
}

/// Dashboard category totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCountsResponse {
    pub active: u32,
    pub completed: u32,
    pub on_hold: u32,
}

/// Binds the process store to a database file.
///
/// Input semantics:
/// - `db_path`: absolute file path; parent directory must exist.
///
/// # FFI contract
/// - Must run before the first store call to take effect; later calls with
///   the same path are no-ops, a different path is rejected.
/// - Returns empty string on success and error message on failure.
pub fn store_init(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "store already bound to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    match with_store(|_| ()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Returns the canonical project list.
pub fn projects_list() -> ProjectListResponse {
    match with_store(|store| store.list()) {
        Ok(projects) => ProjectListResponse {
            ok: true,
            message: format!("{} project(s).", projects.len()),
            items: projects.into_iter().map(to_project_item).collect(),
        },
        Err(err) => ProjectListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("projects_list failed: {err}"),
        },
    }
}

/// Returns one project for the detail screen, `None` when absent.
pub fn project_get(id: i64) -> Option<ProjectItem> {
    with_store(|store| store.get(id))
        .ok()
        .flatten()
        .map(to_project_item)
}

/// Creates a project from the create form.
///
/// Online: committed with a new id. Offline: queued until reconnect.
pub fn project_create(request: ProjectCreateRequest) -> ProjectActionResponse {
    let draft = match to_project_draft(request) {
        Ok(draft) => draft,
        Err(err) => return ProjectActionResponse::failure(format!("project_create failed: {err}")),
    };

    match with_store(|store| (store.create(draft), store.pending_count())) {
        Ok((CreateOutcome::Committed(project), pending)) => {
            ProjectActionResponse::success("Project created.", Some(project.id), pending)
        }
        Ok((CreateOutcome::Queued { pending }, _)) => ProjectActionResponse {
            queued: true,
            ..ProjectActionResponse::success(
                "Offline: project will be created when connection returns.",
                None,
                pending,
            )
        },
        Ok((CreateOutcome::IdSpaceExhausted, _)) => ProjectActionResponse::failure(
            "project_create failed: project id space exhausted",
        ),
        Err(err) => ProjectActionResponse::failure(format!("project_create failed: {err}")),
    }
}

/// Replaces the status of one project.
pub fn project_update_status(id: i64, status: String) -> ProjectActionResponse {
    let Some(status) = ProjectStatus::parse(&status) else {
        return ProjectActionResponse::failure(format!(
            "project_update_status failed: unknown status `{status}`"
        ));
    };
    write_response(id, "project_update_status", |store| {
        store.update_status(id, status)
    })
}

/// Shallow-merges the present fields into one project.
pub fn project_update_fields(id: i64, patch: ProjectPatchRequest) -> ProjectActionResponse {
    let patch = match to_project_patch(patch) {
        Ok(patch) => patch,
        Err(err) => {
            return ProjectActionResponse::failure(format!("project_update_fields failed: {err}"))
        }
    };
    write_response(id, "project_update_fields", |store| {
        store.update_fields(id, &patch)
    })
}

/// Removes one project.
pub fn project_delete(id: i64) -> ProjectActionResponse {
    write_response(id, "project_delete", |store| store.delete(id))
}

/// Pushes the platform's network reachability into core.
///
/// A transition to online drains queued creations.
#[flutter_rust_bridge::frb(sync)]
pub fn network_report(online: bool) -> String {
    match with_store(|store| store.connectivity().report(online)) {
        Ok(_) => String::new(),
        Err(err) => format!("network_report failed: {err}"),
    }
}

/// Returns the current reachability as seen by core (unknown reads offline).
#[flutter_rust_bridge::frb(sync)]
pub fn network_is_online() -> bool {
    with_store(|store| store.connectivity().is_reachable()).unwrap_or(false)
}

/// Returns the number of creations waiting for reconnect.
#[flutter_rust_bridge::frb(sync)]
pub fn projects_pending_count() -> u32 {
    with_store(|store| clamp_count(store.pending_count())).unwrap_or(0)
}

/// Returns dashboard category totals.
pub fn projects_status_counts() -> StatusCountsResponse {
    with_store(|store| store.status_counts())
        .map(|counts| StatusCountsResponse {
            active: clamp_count(counts.active),
            completed: clamp_count(counts.completed),
            on_hold: clamp_count(counts.on_hold),
        })
        .unwrap_or_default()
}

/// Drains the offline queue now, when online.
pub fn projects_sync_now() -> ProjectActionResponse {
    let result = with_store(|store| {
        if !store.connectivity().is_reachable() {
            return None;
        }
        Some((store.reconnect_sync(), store.pending_count()))
    });
    match result {
        Ok(None) => ProjectActionResponse::failure("Offline: sync postponed."),
        Ok(Some((SyncOutcome::Drained { ids }, pending))) => ProjectActionResponse::success(
            format!("Synced {} project(s).", ids.len()),
            ids.last().copied(),
            pending,
        ),
        Ok(Some((SyncOutcome::Idle, pending))) => {
            ProjectActionResponse::success("Nothing to sync.", None, pending)
        }
        Ok(Some((SyncOutcome::AlreadyRunning, pending))) => {
            ProjectActionResponse::success("Sync already running.", None, pending)
        }
        Ok(Some((SyncOutcome::IdSpaceExhausted, _))) => ProjectActionResponse::failure(
            "projects_sync_now failed: project id space exhausted",
        ),
        Err(err) => ProjectActionResponse::failure(format!("projects_sync_now failed: {err}")),
    }
}

fn write_response(
    id: i64,
    op: &'static str,
    f: impl FnOnce(&ProjectStore<SqliteSlotStore>) -> WriteOutcome,
) -> ProjectActionResponse {
    match with_store(|store| (f(store), store.pending_count())) {
        Ok((WriteOutcome::Applied, pending)) => {
            ProjectActionResponse::success("Project updated.", Some(id), pending)
        }
        Ok((WriteOutcome::NotFound, pending)) => {
            ProjectActionResponse::success("Project not found; nothing changed.", None, pending)
        }
        Err(err) => ProjectActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(f: impl FnOnce(&ProjectStore<SqliteSlotStore>) -> T) -> Result<T, String> {
    if let Some(store) = STORE.get() {
        return Ok(f(store));
    }

    let db_path = resolve_store_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("store DB open failed: {err}"))?;
    let observer = Arc::new(ConnectivityObserver::new());
    let candidate = Arc::new(ProjectStore::open(SqliteSlotStore::new(conn), observer));

    // Another caller may have raced us; only the winner gets bound.
    let store = STORE.get_or_init(|| {
        bind_reconnect_sync(&candidate);
        info!("event=store_init module=ffi status=ok");
        Arc::clone(&candidate)
    });
    if !Arc::ptr_eq(store, &candidate) {
        warn!("event=store_init module=ffi status=skipped reason=already_initialized");
    }
    Ok(f(store))
}

fn to_project_item(project: Project) -> ProjectItem {
    ProjectItem {
        id: project.id,
        title: project.title,
        date: project.date,
        description: project.description,
        hours: project.hours,
        team_members: project
            .team_members
            .into_iter()
            .map(|member| TeamMemberItem {
                name: member.name,
                color_index: member.color_index,
            })
            .collect(),
        icon_type: project.icon_type.as_str().to_string(),
        background_color: project.background_color,
        status: project.status.as_str().to_string(),
    }
}

fn to_team_members(items: Vec<TeamMemberItem>) -> Vec<TeamMember> {
    items
        .into_iter()
        .map(|item| TeamMember::new(item.name, item.color_index))
        .collect()
}

fn parse_icon(value: &str) -> Result<IconType, String> {
    IconType::parse(value).ok_or_else(|| format!("unknown icon type `{value}`"))
}

fn to_project_draft(request: ProjectCreateRequest) -> Result<ProjectDraft, String> {
    let draft = ProjectDraft {
        title: request.title.trim().to_string(),
        date: request.date.trim().to_string(),
        description: request.description.trim().to_string(),
        hours: total_hours_label(&request.task_hours),
        team_members: to_team_members(request.team_members),
        icon_type: parse_icon(&request.icon_type)?,
        background_color: request.background_color,
        status: ProjectStatus::Active,
    };
    draft.validate().map_err(|err| err.to_string())?;
    Ok(draft)
}

fn to_project_patch(request: ProjectPatchRequest) -> Result<ProjectPatch, String> {
    let icon_type = request.icon_type.as_deref().map(parse_icon).transpose()?;
    let status = request
        .status
        .as_deref()
        .map(|value| {
            ProjectStatus::parse(value).ok_or_else(|| format!("unknown status `{value}`"))
        })
        .transpose()?;
    Ok(ProjectPatch {
        title: request.title,
        date: request.date,
        description: request.description,
        hours: request.hours,
        team_members: request.team_members.map(to_team_members),
        icon_type,
        background_color: request.background_color,
        status,
    })
}

fn clamp_count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, network_is_online, network_report, ping, project_create,
        project_delete, project_get, project_update_fields, project_update_status,
        projects_list, projects_pending_count, projects_status_counts, projects_sync_now,
        store_init, to_project_draft, to_project_patch, ProjectCreateRequest,
        ProjectPatchRequest, TeamMemberItem,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_request_sums_task_hours_and_defaults_to_active() {
        let draft = to_project_draft(create_request("  Portfolio  ")).expect("valid request");
        assert_eq!(draft.title, "Portfolio");
        assert_eq!(draft.hours, "11 hours");
        assert_eq!(draft.status.as_str(), "active");
    }

    #[test]
    fn create_request_with_huge_task_hours_saturates() {
        let mut request = create_request("Overtime");
        request.task_hours = vec!["9223372036854775807 hr".to_string(), "1 hr".to_string()];
        let draft = to_project_draft(request).expect("valid request");
        assert_eq!(draft.hours, format!("{} hours", i64::MAX));
    }

    #[test]
    fn create_request_rejects_blank_title_and_unknown_icon() {
        let err = to_project_draft(create_request("   ")).expect_err("blank title");
        assert!(err.contains("title"));

        let mut request = create_request("ok");
        request.icon_type = "game".to_string();
        let err = to_project_draft(request).expect_err("unknown icon");
        assert!(err.contains("icon"));
    }

    #[test]
    fn patch_request_parses_labels() {
        let patch = to_project_patch(ProjectPatchRequest {
            status: Some("on-hold".to_string()),
            ..ProjectPatchRequest::default()
        })
        .expect("valid patch");
        assert_eq!(patch.status.map(|status| status.as_str()), Some("on-hold"));

        let err = to_project_patch(ProjectPatchRequest {
            status: Some("paused".to_string()),
            ..ProjectPatchRequest::default()
        })
        .expect_err("unknown status");
        assert!(err.contains("paused"));
    }

    // The store is process-wide, so the end-to-end flow lives in one test.
    #[test]
    fn store_flow_queues_offline_and_drains_on_reconnect() {
        let db_path = std::env::temp_dir().join(format!("{}.sqlite3", unique_token("pb-ffi")));
        assert_eq!(store_init(db_path.display().to_string()), "");
        assert!(!store_init("/elsewhere/other.sqlite3".to_string()).is_empty());

        let initial = projects_list();
        assert!(initial.ok, "{}", initial.message);
        assert_eq!(initial.items.len(), 5);
        assert!(!network_is_online());

        let queued = project_create(create_request("Offline work"));
        assert!(queued.ok, "{}", queued.message);
        assert!(queued.queued);
        assert_eq!(queued.pending_count, 1);
        assert_eq!(projects_list().items.len(), 5);
        assert!(!projects_sync_now().ok);

        assert_eq!(network_report(true), "");
        assert!(network_is_online());
        assert_eq!(projects_pending_count(), 0);
        let listed = projects_list().items;
        assert_eq!(listed.len(), 6);
        assert_eq!(listed[0].id, 6);
        assert_eq!(listed[0].title, "Offline work");
        assert_eq!(listed[0].hours, "11 hours");

        let created = project_create(create_request("Online work"));
        assert_eq!(created.project_id, Some(7));
        assert!(!created.queued);

        let updated = project_update_status(7, "completed".to_string());
        assert_eq!(updated.project_id, Some(7));
        assert_eq!(project_get(7).expect("project 7").status, "completed");
        assert!(!project_update_status(7, "paused".to_string()).ok);

        let patched = project_update_fields(
            7,
            ProjectPatchRequest {
                title: Some("Renamed".to_string()),
                ..ProjectPatchRequest::default()
            },
        );
        assert!(patched.ok);
        assert_eq!(project_get(7).expect("project 7").title, "Renamed");

        assert_eq!(project_delete(7).project_id, Some(7));
        let missing = project_delete(7);
        assert!(missing.ok);
        assert_eq!(missing.project_id, None);
        assert!(project_get(7).is_none());

        let counts = projects_status_counts();
        assert_eq!(counts.active + counts.completed + counts.on_hold, 6);
        assert_eq!(projects_sync_now().message, "Nothing to sync.");
    }

    fn create_request(title: &str) -> ProjectCreateRequest {
        ProjectCreateRequest {
            title: title.to_string(),
            description: "Client work".to_string(),
            date: "1 December".to_string(),
            task_hours: vec!["8 hr".to_string(), "3 hr".to_string()],
            team_members: vec![TeamMemberItem {
                name: "John Doe".to_string(),
                color_index: 0,
            }],
            icon_type: "website".to_string(),
            background_color: "#DEECEC".to_string(),
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
