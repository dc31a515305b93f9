//! Publishing catalog records.
//!
//! # Invariants
//! - Ownership splits are transported as `[contributor, percentage]` pairs.
//! - Persisted works created before splits were mandatory decode with an
//!   empty split list; only new works are held to the split rules.

use serde::{Deserialize, Serialize};

use super::identity::Principal;
use super::kind::{ArtistDevelopmentId, EntityKind, MemberId, ProjectId, PublishingId, ReleaseId};
use super::record::{non_blank, LinkedRecord};
use super::validation::{require_text, validate_ownership_splits, ValidationError};
use crate::normalize::{lenient_option, lenient_or_default, lenient_principal, lenient_vec};

/// One contributor's share of a work, in whole percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, i64)", into = "(String, i64)")]
pub struct OwnershipSplit {
    pub contributor: String,
    pub percentage: i64,
}

impl OwnershipSplit {
    pub fn new(contributor: impl Into<String>, percentage: i64) -> Self {
        Self {
            contributor: contributor.into(),
            percentage,
        }
    }
}

impl From<(String, i64)> for OwnershipSplit {
    fn from((contributor, percentage): (String, i64)) -> Self {
        Self {
            contributor,
            percentage,
        }
    }
}

impl From<OwnershipSplit> for (String, i64) {
    fn from(value: OwnershipSplit) -> Self {
        (value.contributor, value.percentage)
    }
}

/// Publishing work with its four link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingWork {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: PublishingId,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub contributors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub ownership_splits: Vec<OwnershipSplit>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub iswc: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub isrc: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub registration_status: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "lenient_principal")]
    pub owner: Option<Principal>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_members: Vec<MemberId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_artists: Vec<ArtistDevelopmentId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_releases: Vec<ReleaseId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_projects: Vec<ProjectId>,
}

impl PublishingWork {
    /// Sum of split percentages; zero when splits are absent.
    pub fn split_total(&self) -> i64 {
        self.ownership_splits
            .iter()
            .fold(0_i64, |sum, split| sum.saturating_add(split.percentage))
    }
}

impl LinkedRecord for PublishingWork {
    const KIND: EntityKind = EntityKind::PublishingWork;

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
            EntityKind::Release => &self.linked_releases,
            EntityKind::RecordingProject => &self.linked_projects,
            EntityKind::PublishingWork => &[],
        }
    }

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        match kind {
            EntityKind::Membership => Some(&mut self.linked_members),
            EntityKind::ArtistDevelopment => Some(&mut self.linked_artists),
            EntityKind::Release => Some(&mut self.linked_releases),
            EntityKind::RecordingProject => Some(&mut self.linked_projects),
            EntityKind::PublishingWork => None,
        }
    }
}

/// Request for registering a new publishing work.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPublishingWork {
    pub title: String,
    pub contributors: Vec<String>,
    pub ownership_splits: Vec<OwnershipSplit>,
    pub iswc: Option<String>,
    pub isrc: Option<String>,
    pub registration_status: String,
}

impl NewPublishingWork {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        validate_ownership_splits(&self.ownership_splits)
    }
}

#[cfg(test)]
mod tests {
    use super::{OwnershipSplit, PublishingWork};
    use serde_json::json;

    #[test]
    fn splits_decode_from_pairs() {
        let work: PublishingWork = serde_json::from_value(json!({
            "id": "w-1",
            "title": "Night Bus",
            "ownershipSplits": [["Ada", 60], ["Lin", 40]]
        }))
        .expect("work should decode");
        assert_eq!(
            work.ownership_splits,
            vec![OwnershipSplit::new("Ada", 60), OwnershipSplit::new("Lin", 40)]
        );
        assert_eq!(work.split_total(), 100);
    }

    #[test]
    fn legacy_work_without_splits_decodes() {
        let work: PublishingWork = serde_json::from_value(json!({
            "id": "w-legacy",
            "title": "Old Song"
        }))
        .expect("legacy work should decode");
        assert!(work.ownership_splits.is_empty());
        assert_eq!(work.split_total(), 0);
        assert!(work.owner.is_none());
    }
}
