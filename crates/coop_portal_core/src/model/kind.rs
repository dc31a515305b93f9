//! Entity kind registry.
//!
//! # Responsibility
//! - Enumerate the five linkable entity kinds.
//! - Declare which kinds each anchor kind may link to.
//!
//! # Invariants
//! - An anchor never links to its own kind, except `ArtistDevelopment`.
//! - Memberships never link to other memberships.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Membership identifier (also the profile id).
pub type MemberId = String;
/// Publishing work identifier.
pub type PublishingId = String;
/// Label release identifier.
pub type ReleaseId = String;
/// Recording project identifier.
pub type ProjectId = String;
/// Artist development entry identifier.
pub type ArtistDevelopmentId = String;

/// The five linkable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Membership,
    PublishingWork,
    Release,
    RecordingProject,
    ArtistDevelopment,
}

const MEMBERSHIP_LINKS: &[EntityKind] = &[
    EntityKind::ArtistDevelopment,
    EntityKind::PublishingWork,
    EntityKind::Release,
    EntityKind::RecordingProject,
];
const PUBLISHING_LINKS: &[EntityKind] = &[
    EntityKind::Membership,
    EntityKind::ArtistDevelopment,
    EntityKind::Release,
    EntityKind::RecordingProject,
];
const RELEASE_LINKS: &[EntityKind] = &[
    EntityKind::Membership,
    EntityKind::ArtistDevelopment,
    EntityKind::PublishingWork,
    EntityKind::RecordingProject,
];
const PROJECT_LINKS: &[EntityKind] = &[
    EntityKind::Membership,
    EntityKind::ArtistDevelopment,
    EntityKind::PublishingWork,
    EntityKind::Release,
];
const ARTIST_LINKS: &[EntityKind] = &[
    EntityKind::Membership,
    EntityKind::PublishingWork,
    EntityKind::Release,
    EntityKind::RecordingProject,
    EntityKind::ArtistDevelopment,
];

impl EntityKind {
    /// All kinds in stable display order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Membership,
        EntityKind::ArtistDevelopment,
        EntityKind::PublishingWork,
        EntityKind::Release,
        EntityKind::RecordingProject,
    ];

    /// Stable machine name used in log lines and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::PublishingWork => "publishing_work",
            Self::Release => "release",
            Self::RecordingProject => "recording_project",
            Self::ArtistDevelopment => "artist_development",
        }
    }

    /// Section heading used by link pickers.
    pub fn section_label(self) -> &'static str {
        match self {
            Self::Membership => "Memberships",
            Self::PublishingWork => "Publishing Works",
            Self::Release => "Releases",
            Self::RecordingProject => "Recording Projects",
            Self::ArtistDevelopment => "Artist Development",
        }
    }

    /// Kinds an entity of this kind may hold link sets for.
    pub fn linkable_kinds(self) -> &'static [EntityKind] {
        match self {
            Self::Membership => MEMBERSHIP_LINKS,
            Self::PublishingWork => PUBLISHING_LINKS,
            Self::Release => RELEASE_LINKS,
            Self::RecordingProject => PROJECT_LINKS,
            Self::ArtistDevelopment => ARTIST_LINKS,
        }
    }

    /// Returns whether this kind may link to `other`.
    pub fn links_to(self, other: EntityKind) -> bool {
        self.linkable_kinds().contains(&other)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-tagged reference to one entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::EntityKind;

    #[test]
    fn no_kind_links_to_itself_except_artist_development() {
        for kind in EntityKind::ALL {
            let self_link = kind.links_to(kind);
            assert_eq!(self_link, kind == EntityKind::ArtistDevelopment, "{kind}");
        }
    }

    #[test]
    fn link_tables_are_symmetric() {
        for kind in EntityKind::ALL {
            for other in kind.linkable_kinds() {
                assert!(other.links_to(kind), "{other} should link back to {kind}");
            }
        }
    }

    #[test]
    fn non_artist_kinds_link_to_exactly_four_kinds() {
        for kind in EntityKind::ALL {
            let expected = if kind == EntityKind::ArtistDevelopment {
                5
            } else {
                4
            };
            assert_eq!(kind.linkable_kinds().len(), expected);
        }
    }
}
