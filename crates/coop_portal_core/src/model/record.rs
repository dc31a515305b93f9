//! Uniform access to the five linkable record types.
//!
//! # Responsibility
//! - Expose id, display name, governing principal and link sets through one
//!   trait, so permission and option logic is written once.
//! - Provide a kind-tagged `EntityRecord` for heterogeneous collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::artist::ArtistDevelopment;
use super::identity::Principal;
use super::kind::{EntityKind, EntityRef, MemberId};
use super::membership::Membership;
use super::project::RecordingProject;
use super::publishing::PublishingWork;
use super::release::Release;
use crate::links::{LinkSet, LinkSets};
use crate::normalize::lenient_vec;

/// Shared view over a linkable record.
pub trait LinkedRecord {
    const KIND: EntityKind;

    fn record_id(&self) -> &str;

    /// Natural display name; `None` when missing or blank.
    fn display_name(&self) -> Option<&str>;

    /// Owner principal, or the profile principal for memberships.
    fn governing_principal(&self) -> Option<&Principal>;

    /// Raw link IDs for `kind`; empty for kinds this record cannot link to.
    fn link_ids(&self, kind: EntityKind) -> &[String];

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>>;

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(Self::KIND, self.record_id())
    }

    /// Link sets for every kind this record may link to.
    fn link_sets(&self) -> LinkSets {
        let mut sets = LinkSets::empty_for(Self::KIND);
        for &kind in Self::KIND.linkable_kinds() {
            sets.replace(kind, LinkSet::from_ids(self.link_ids(kind).iter().cloned()));
        }
        sets
    }
}

pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Kind-tagged record of any linkable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum EntityRecord {
    Membership(Membership),
    PublishingWork(PublishingWork),
    Release(Release),
    RecordingProject(RecordingProject),
    ArtistDevelopment(ArtistDevelopment),
}

macro_rules! dispatch {
    ($record:expr, $inner:ident => $body:expr) => {
        match $record {
            EntityRecord::Membership($inner) => $body,
            EntityRecord::PublishingWork($inner) => $body,
            EntityRecord::Release($inner) => $body,
            EntityRecord::RecordingProject($inner) => $body,
            EntityRecord::ArtistDevelopment($inner) => $body,
        }
    };
}

impl EntityRecord {
    /// Decodes a raw backend payload of a known kind.
    ///
    /// Missing fields are normalized; only a non-object payload fails.
    pub fn decode(kind: EntityKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntityKind::Membership => Self::Membership(serde_json::from_value(value)?),
            EntityKind::PublishingWork => Self::PublishingWork(serde_json::from_value(value)?),
            EntityKind::Release => Self::Release(serde_json::from_value(value)?),
            EntityKind::RecordingProject => Self::RecordingProject(serde_json::from_value(value)?),
            EntityKind::ArtistDevelopment => {
                Self::ArtistDevelopment(serde_json::from_value(value)?)
            }
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Membership(_) => EntityKind::Membership,
            Self::PublishingWork(_) => EntityKind::PublishingWork,
            Self::Release(_) => EntityKind::Release,
            Self::RecordingProject(_) => EntityKind::RecordingProject,
            Self::ArtistDevelopment(_) => EntityKind::ArtistDevelopment,
        }
    }

    pub fn id(&self) -> &str {
        dispatch!(self, inner => inner.record_id())
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }

    pub fn display_name(&self) -> Option<&str> {
        dispatch!(self, inner => inner.display_name())
    }

    pub fn governing_principal(&self) -> Option<&Principal> {
        dispatch!(self, inner => inner.governing_principal())
    }

    pub fn link_ids(&self, kind: EntityKind) -> &[String] {
        dispatch!(self, inner => inner.link_ids(kind))
    }

    pub fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        dispatch!(self, inner => inner.link_ids_mut(kind))
    }

    pub fn link_sets(&self) -> LinkSets {
        dispatch!(self, inner => inner.link_sets())
    }
}

impl From<Membership> for EntityRecord {
    fn from(value: Membership) -> Self {
        Self::Membership(value)
    }
}

impl From<PublishingWork> for EntityRecord {
    fn from(value: PublishingWork) -> Self {
        Self::PublishingWork(value)
    }
}

impl From<Release> for EntityRecord {
    fn from(value: Release) -> Self {
        Self::Release(value)
    }
}

impl From<RecordingProject> for EntityRecord {
    fn from(value: RecordingProject) -> Self {
        Self::RecordingProject(value)
    }
}

impl From<ArtistDevelopment> for EntityRecord {
    fn from(value: ArtistDevelopment) -> Self {
        Self::ArtistDevelopment(value)
    }
}

/// Records visible to a non-admin caller, fetched as one aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerEntities {
    /// Keyed pairs; the key is authoritative over `profile.id`.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub memberships: Vec<(MemberId, Membership)>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub publishing_works: Vec<PublishingWork>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub releases: Vec<Release>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub recording_projects: Vec<RecordingProject>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub artist_development: Vec<ArtistDevelopment>,
}

impl CallerEntities {
    /// Flattens the aggregate into kind-tagged records.
    pub fn records(&self) -> Vec<EntityRecord> {
        let mut records = Vec::new();
        records.extend(self.memberships.iter().map(|(id, membership)| {
            let mut membership = membership.clone();
            membership.profile.id = id.clone();
            EntityRecord::Membership(membership)
        }));
        records.extend(
            self.publishing_works
                .iter()
                .cloned()
                .map(EntityRecord::PublishingWork),
        );
        records.extend(self.releases.iter().cloned().map(EntityRecord::Release));
        records.extend(
            self.recording_projects
                .iter()
                .cloned()
                .map(EntityRecord::RecordingProject),
        );
        records.extend(
            self.artist_development
                .iter()
                .cloned()
                .map(EntityRecord::ArtistDevelopment),
        );
        records
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.memberships.len()
            + self.publishing_works.len()
            + self.releases.len()
            + self.recording_projects.len()
            + self.artist_development.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{CallerEntities, EntityRecord};
    use crate::model::EntityKind;
    use serde_json::json;

    #[test]
    fn decode_rejects_only_non_objects() {
        let record = EntityRecord::decode(EntityKind::Release, json!({ "id": "r-1" }))
            .expect("sparse release should decode");
        assert_eq!(record.id(), "r-1");
        assert!(record.display_name().is_none());
        assert!(EntityRecord::decode(EntityKind::Release, json!("r-1")).is_err());
    }

    #[test]
    fn caller_aggregate_tolerates_missing_collections() {
        let entities: CallerEntities = serde_json::from_value(json!({
            "memberships": [["m-1", { "profile": { "name": "Ada" } }]],
            "releases": null
        }))
        .expect("aggregate should decode");
        assert_eq!(entities.len(), 1);
        let records = entities.records();
        assert_eq!(records[0].id(), "m-1");
        assert_eq!(records[0].display_name(), Some("Ada"));
    }

    #[test]
    fn link_sets_cover_every_linkable_kind() {
        let record = EntityRecord::decode(
            EntityKind::ArtistDevelopment,
            json!({ "id": "a-1", "relatedPublishing": ["w-1", "w-1"] }),
        )
        .expect("artist entry should decode");
        let sets = record.link_sets();
        assert_eq!(sets.kinds().count(), 5);
        assert_eq!(sets.get(EntityKind::PublishingWork).len(), 1);
    }
}
