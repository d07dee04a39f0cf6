//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical project record rendered by list/detail/dashboard views.
//! - Provide id assignment and partial-update helpers used by the store.
//!
//! # Invariants
//! - `id` is unique within one canonical list.
//! - New ids are `max(existing ids, 0) + 1` at commit time.
//! - `id` is never changed by a partial update.
//!
//! # See also
//! - docs/architecture/project-store.md

use crate::model::draft::ProjectDraft;
use serde::{Deserialize, Serialize};

/// Numeric project identifier, assigned by the store on commit.
pub type ProjectId = i64;

/// Project category driving the card icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    Fintech,
    Website,
    Mobile,
    Design,
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Work is ongoing.
    Active,
    /// Delivered.
    Completed,
    /// Paused; serialized as `on-hold`.
    OnHold,
}

impl ProjectStatus {
    /// Returns the stable wire label (`active|completed|on-hold`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    /// Parses a wire label. Accepts surrounding whitespace and any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "on-hold" | "on_hold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

impl IconType {
    /// Returns the stable wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fintech => "fintech",
            Self::Website => "website",
            Self::Mobile => "mobile",
            Self::Design => "design",
        }
    }

    /// Parses a wire label. Accepts surrounding whitespace and any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fintech" => Some(Self::Fintech),
            "website" => Some(Self::Website),
            "mobile" => Some(Self::Mobile),
            "design" => Some(Self::Design),
            _ => None,
        }
    }
}

/// One assigned team member, rendered as a colored avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    /// Index into the avatar palette.
    pub color_index: i64,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, color_index: i64) -> Self {
        Self {
            name: name.into(),
            color_index,
        }
    }
}

/// Canonical project record.
///
/// Field names serialize in camelCase to match the persisted slot schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    /// Free-form display date, never parsed.
    pub date: String,
    pub description: String,
    /// Display string such as `91 hours`.
    pub hours: String,
    pub team_members: Vec<TeamMember>,
    pub icon_type: IconType,
    /// Card background color, e.g. `#F8E9C8`.
    pub background_color: String,
    pub status: ProjectStatus,
}

impl Project {
    /// Builds a committed record from a draft and an assigned id.
    pub fn from_draft(id: ProjectId, draft: ProjectDraft) -> Self {
        Self {
            id,
            title: draft.title,
            date: draft.date,
            description: draft.description,
            hours: draft.hours,
            team_members: draft.team_members,
            icon_type: draft.icon_type,
            background_color: draft.background_color,
            status: draft.status,
        }
    }

    /// Shallow-merges present patch fields into this record.
    pub fn apply_patch(&mut self, patch: &ProjectPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(hours) = &patch.hours {
            self.hours = hours.clone();
        }
        if let Some(team_members) = &patch.team_members {
            self.team_members = team_members.clone();
        }
        if let Some(icon_type) = patch.icon_type {
            self.icon_type = icon_type;
        }
        if let Some(background_color) = &patch.background_color {
            self.background_color = background_color.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial update for one project. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub hours: Option<String>,
    pub team_members: Option<Vec<TeamMember>>,
    pub icon_type: Option<IconType>,
    pub background_color: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Per-status totals for dashboard category tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub active: usize,
    pub completed: usize,
    pub on_hold: usize,
}

impl StatusCounts {
    /// Counts projects per status.
    pub fn from_projects(projects: &[Project]) -> Self {
        projects
            .iter()
            .fold(Self::default(), |mut counts, project| {
                match project.status {
                    ProjectStatus::Active => counts.active += 1,
                    ProjectStatus::Completed => counts.completed += 1,
                    ProjectStatus::OnHold => counts.on_hold += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.active + self.completed + self.on_hold
    }
}

/// Returns the id the next committed project receives.
///
/// Computed as `max(existing ids, 0) + 1`, so ids never go below 1 even when
/// the list is empty or only holds non-positive ids. Returns `None` once the
/// id space is exhausted (a list already holding `i64::MAX`).
pub fn next_project_id(projects: &[Project]) -> Option<ProjectId> {
    projects
        .iter()
        .map(|project| project.id)
        .fold(0, ProjectId::max)
        .checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::{next_project_id, ProjectId, ProjectPatch, ProjectStatus, StatusCounts};
    use crate::model::seed::seed_projects;

    #[test]
    fn next_id_starts_at_one_for_empty_list() {
        assert_eq!(next_project_id(&[]), Some(1));
    }

    #[test]
    fn next_id_uses_max_not_length() {
        let mut projects = seed_projects();
        projects.retain(|project| project.id != 2);
        assert_eq!(next_project_id(&projects), Some(6));
    }

    #[test]
    fn next_id_is_none_when_id_space_is_exhausted() {
        let mut projects = seed_projects();
        projects[0].id = ProjectId::MAX;
        assert_eq!(next_project_id(&projects), None);

        projects[0].id = ProjectId::MAX - 1;
        assert_eq!(next_project_id(&projects), Some(ProjectId::MAX));
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::OnHold,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse(" ON-HOLD "), Some(ProjectStatus::OnHold));
        assert_eq!(ProjectStatus::parse("paused"), None);
    }

    #[test]
    fn apply_patch_only_touches_present_fields() {
        let mut project = seed_projects().remove(0);
        let before = project.clone();
        project.apply_patch(&ProjectPatch {
            hours: Some("100 hours".to_string()),
            ..ProjectPatch::default()
        });

        assert_eq!(project.hours, "100 hours");
        assert_eq!(project.id, before.id);
        assert_eq!(project.title, before.title);
        assert_eq!(project.team_members, before.team_members);
        assert!(ProjectPatch::default().is_empty());
    }

    #[test]
    fn status_counts_cover_seed() {
        let counts = StatusCounts::from_projects(&seed_projects());
        assert_eq!(counts.active, 3);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.on_hold, 1);
        assert_eq!(counts.total(), 5);
    }
}
