//! Label release records.

use serde::{Deserialize, Serialize};

use super::identity::Principal;
use super::kind::{ArtistDevelopmentId, EntityKind, MemberId, ProjectId, PublishingId, ReleaseId};
use super::record::{non_blank, LinkedRecord};
use super::validation::{require_text, ValidationError};
use crate::normalize::{lenient_or_default, lenient_principal, lenient_vec};

/// Label release with its four link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: ReleaseId,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub release_type: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tracklist: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub key_dates: Vec<String>,
    /// Free-text rights holders, distinct from the owning principal.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub owners: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub workflow_checklist: Vec<String>,
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
    pub linked_projects: Vec<ProjectId>,
}

impl LinkedRecord for Release {
    const KIND: EntityKind = EntityKind::Release;

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
            EntityKind::RecordingProject => &self.linked_projects,
            EntityKind::Release => &[],
        }
    }

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        match kind {
            EntityKind::Membership => Some(&mut self.linked_members),
            EntityKind::ArtistDevelopment => Some(&mut self.linked_artists),
            EntityKind::PublishingWork => Some(&mut self.linked_works),
            EntityKind::RecordingProject => Some(&mut self.linked_projects),
            EntityKind::Release => None,
        }
    }
}

/// Request for creating a release.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRelease {
    pub title: String,
    pub release_type: String,
    pub tracklist: Vec<String>,
    pub key_dates: Vec<String>,
    pub owners: Vec<String>,
}

impl NewRelease {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("release type", &self.release_type)
    }
}
