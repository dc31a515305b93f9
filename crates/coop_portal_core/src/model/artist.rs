//! Artist development records.
//!
//! Artist development is the only kind that links to its own kind. An entry
//! must not list itself among its related entries.

use serde::{Deserialize, Serialize};

use super::identity::Principal;
use super::kind::{ArtistDevelopmentId, EntityKind, MemberId, ProjectId, PublishingId, ReleaseId};
use super::record::{non_blank, LinkedRecord};
use super::validation::{require_text, ValidationError};
use crate::normalize::{lenient_or_default, lenient_principal, lenient_vec};

/// Artist development entry with its five link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDevelopment {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: ArtistDevelopmentId,
    /// Artist name or handle; the display name of the entry.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub artist_id: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub goals: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub plans: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub milestones: Vec<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub internal_notes: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient_principal")]
    pub owner: Option<Principal>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_memberships: Vec<MemberId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_publishing: Vec<PublishingId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_label_entities: Vec<ReleaseId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_recording_projects: Vec<ProjectId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_artist_development: Vec<ArtistDevelopmentId>,
}

impl LinkedRecord for ArtistDevelopment {
    const KIND: EntityKind = EntityKind::ArtistDevelopment;

    fn record_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        non_blank(&self.artist_id)
    }

    fn governing_principal(&self) -> Option<&Principal> {
        self.owner.as_ref()
    }

    fn link_ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Membership => &self.related_memberships,
            EntityKind::PublishingWork => &self.related_publishing,
            EntityKind::Release => &self.related_label_entities,
            EntityKind::RecordingProject => &self.related_recording_projects,
            EntityKind::ArtistDevelopment => &self.related_artist_development,
        }
    }

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        Some(match kind {
            EntityKind::Membership => &mut self.related_memberships,
            EntityKind::PublishingWork => &mut self.related_publishing,
            EntityKind::Release => &mut self.related_label_entities,
            EntityKind::RecordingProject => &mut self.related_recording_projects,
            EntityKind::ArtistDevelopment => &mut self.related_artist_development,
        })
    }
}

/// Request for opening an artist development entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewArtistDevelopment {
    pub artist_id: String,
    pub goals: Vec<String>,
    pub plans: Vec<String>,
    pub milestones: Vec<String>,
    pub internal_notes: String,
}

impl NewArtistDevelopment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("artist", &self.artist_id)
    }
}
