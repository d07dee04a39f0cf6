//! Project creation payload and create-flow helpers.
//!
//! # Responsibility
//! - Define the id-less payload accepted by `create` and held by the offline queue.
//! - Validate create-form input before it reaches the store.
//! - Derive the `hours` display label from per-task hour labels.
//!
//! # Invariants
//! - A draft never carries an id; ids are assigned only on commit.
//! - Validation is a caller-side gate; the store accepts any draft.

use crate::model::project::{IconType, ProjectStatus, TeamMember};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer regex"));

/// Project fields minus `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: String,
    pub date: String,
    pub description: String,
    pub hours: String,
    pub team_members: Vec<TeamMember>,
    pub icon_type: IconType,
    pub background_color: String,
    pub status: ProjectStatus,
}

impl ProjectDraft {
    /// Creates a draft with create-flow defaults.
    ///
    /// Defaults: empty text fields, `0 hours`, no members, `fintech` icon,
    /// beige background and `active` status.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: String::new(),
            description: String::new(),
            hours: total_hours_label::<&str>(&[]),
            team_members: Vec::new(),
            icon_type: IconType::Fintech,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            status: ProjectStatus::Active,
        }
    }

    /// Checks the required create-form fields.
    ///
    /// # Errors
    /// - Title, description or date is blank.
    /// - No team member is assigned.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.title.trim().is_empty() {
            return Err(ProjectValidationError::BlankTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ProjectValidationError::BlankDescription);
        }
        if self.date.trim().is_empty() {
            return Err(ProjectValidationError::BlankDate);
        }
        if self.team_members.is_empty() {
            return Err(ProjectValidationError::NoTeamMembers);
        }
        Ok(())
    }
}

/// Card color used when the create form keeps its first palette entry.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#F8E9C8";

/// Create-form validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectValidationError {
    BlankTitle,
    BlankDescription,
    BlankDate,
    NoTeamMembers,
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "project title is required"),
            Self::BlankDescription => write!(f, "project description is required"),
            Self::BlankDate => write!(f, "project due date is required"),
            Self::NoTeamMembers => write!(f, "at least one team member must be assigned"),
        }
    }
}

impl Error for ProjectValidationError {}

/// Renders the project `hours` label from task hour labels such as `12 hr`.
///
/// Each entry contributes its leading integer; entries without one (or with
/// one outside `i64`) count as 0. The total saturates instead of overflowing.
pub fn total_hours_label<S: AsRef<str>>(task_hours: &[S]) -> String {
    let total = task_hours
        .iter()
        .filter_map(|label| {
            LEADING_INT_RE
                .captures(label.as_ref())
                .and_then(|caps| caps.get(1))
                .and_then(|value| value.as_str().parse::<i64>().ok())
        })
        .fold(0i64, i64::saturating_add);
    format!("{total} hours")
}
