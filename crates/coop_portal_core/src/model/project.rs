//! Recording project records.

use serde::{Deserialize, Serialize};

use super::identity::Principal;
use super::kind::{ArtistDevelopmentId, EntityKind, MemberId, ProjectId, PublishingId, ReleaseId};
use super::record::{non_blank, LinkedRecord};
use super::validation::{require_text, ValidationError};
use crate::normalize::{lenient_or_default, lenient_principal, lenient_vec};

/// Recording project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

/// Recording project with its four link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingProject {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: ProjectId,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub participants: Vec<String>,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub session_date: i64,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub asset_references: Vec<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient_principal")]
    pub owner: Option<Principal>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_members: Vec<MemberId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_artists: Vec<ArtistDevelopmentId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_works: Vec<PublishingId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_releases: Vec<ReleaseId>,
}

impl LinkedRecord for RecordingProject {
    const KIND: EntityKind = EntityKind::RecordingProject;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    fn governing_principal(&self) -> Option<&Principal> {
        self.owner.as_ref()
    }

    fn link_ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Membership => &self.linked_members,
            EntityKind::ArtistDevelopment => &self.linked_artists,
            EntityKind::PublishingWork => &self.linked_works,
            EntityKind::Release => &self.linked_releases,
            EntityKind::RecordingProject => &[],
        }
    }

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        match kind {
            EntityKind::Membership => Some(&mut self.linked_members),
            EntityKind::ArtistDevelopment => Some(&mut self.linked_artists),
            EntityKind::PublishingWork => Some(&mut self.linked_works),
            EntityKind::Release => Some(&mut self.linked_releases),
            EntityKind::RecordingProject => None,
        }
    }
}

/// Request for creating a recording project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecordingProject {
    pub title: String,
    pub participants: Vec<String>,
    /// Unix epoch milliseconds.
    pub session_date: i64,
    pub status: ProjectStatus,
    pub notes: String,
}

impl NewRecordingProject {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectStatus, RecordingProject};
    use serde_json::json;

    #[test]
    fn status_uses_snake_case_wire_names() {
        let project: RecordingProject = serde_json::from_value(json!({
            "id": "p-1",
            "title": "Tape Week",
            "status": "in_progress"
        }))
        .expect("project should decode");
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.status.as_str(), "in_progress");
    }
}
