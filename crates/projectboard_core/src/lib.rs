//! Core domain logic for Projectboard.
//! This crate is the single source of truth for project state invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{total_hours_label, ProjectDraft, ProjectValidationError};
pub use model::project::{
    IconType, Project, ProjectId, ProjectPatch, ProjectStatus, StatusCounts, TeamMember,
};
pub use model::seed::seed_projects;
pub use repo::slot_repo::{
    SlotError, SlotResult, SlotStore, SlotWrite, SqliteSlotStore, OFFLINE_PROJECTS_SLOT,
    PROJECTS_SLOT,
};
pub use service::project_store::{CreateOutcome, ProjectStore, SyncOutcome, WriteOutcome};
pub use sync::connectivity::ConnectivityObserver;
pub use sync::listeners::SubscriptionId;
pub use sync::reconnect::bind_reconnect_sync;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
