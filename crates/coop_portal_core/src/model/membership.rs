//! Membership records.
//!
//! A membership is governed by the principal stored on its profile, not by a
//! separate owner field.

use serde::{Deserialize, Serialize};

use super::identity::Principal;
use super::kind::{ArtistDevelopmentId, EntityKind, MemberId, ProjectId, PublishingId, ReleaseId};
use super::record::{non_blank, LinkedRecord};
use super::validation::{require_text, validate_email, ValidationError};
use crate::normalize::{lenient_or_default, lenient_principal, lenient_vec};

/// Membership lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Applicant,
    Active,
    Inactive,
    Paused,
}

/// Profile fields of a membership.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipProfile {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: MemberId,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub status: MemberStatus,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tier: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub agreements: Vec<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub notes: String,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub updated_at: i64,
    /// Principal of the person this membership represents.
    #[serde(default, deserialize_with = "lenient_principal")]
    pub principal: Option<Principal>,
}

/// Tier attached to a membership.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTier {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub fee: u64,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub benefits: Vec<String>,
}

/// Membership with its four link sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub profile: MembershipProfile,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tier: MembershipTier,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_artists: Vec<ArtistDevelopmentId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_works: Vec<PublishingId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_releases: Vec<ReleaseId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_projects: Vec<ProjectId>,
}

impl LinkedRecord for Membership {
    const KIND: EntityKind = EntityKind::Membership;

    fn record_id(&self) -> &str {
        &self.profile.id
    }

    fn display_name(&self) -> Option<&str> {
        non_blank(&self.profile.name)
    }

    fn governing_principal(&self) -> Option<&Principal> {
        self.profile.principal.as_ref()
    }

    fn link_ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::ArtistDevelopment => &self.linked_artists,
            EntityKind::PublishingWork => &self.linked_works,
            EntityKind::Release => &self.linked_releases,
            EntityKind::RecordingProject => &self.linked_projects,
            EntityKind::Membership => &[],
        }
    }

    fn link_ids_mut(&mut self, kind: EntityKind) -> Option<&mut Vec<String>> {
        match kind {
            EntityKind::ArtistDevelopment => Some(&mut self.linked_artists),
            EntityKind::PublishingWork => Some(&mut self.linked_works),
            EntityKind::Release => Some(&mut self.linked_releases),
            EntityKind::RecordingProject => Some(&mut self.linked_projects),
            EntityKind::Membership => None,
        }
    }
}

/// Request for creating a membership profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMembership {
    /// Member number chosen by the co-op.
    pub id: MemberId,
    pub name: String,
    pub email: String,
}

impl NewMembership {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("membership id", &self.id)?;
        require_text("name", &self.name)?;
        validate_email(&self.email)
    }
}

/// Editable profile fields of an existing membership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembershipUpdate {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub status: MemberStatus,
}

impl MembershipUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        validate_email(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberStatus, Membership, MembershipUpdate};
    use crate::model::ValidationError;
    use crate::model::record::LinkedRecord;
    use crate::model::EntityKind;
    use serde_json::json;

    #[test]
    fn decodes_partial_membership_from_older_schema() {
        let membership: Membership = serde_json::from_value(json!({
            "profile": { "id": "m-1", "name": "Ada", "status": "active" },
            "linkedWorks": null,
            "linkedArtists": "not-a-list"
        }))
        .expect("partial membership should decode");

        assert_eq!(membership.record_id(), "m-1");
        assert_eq!(membership.profile.status, MemberStatus::Active);
        assert!(membership.link_ids(EntityKind::PublishingWork).is_empty());
        assert!(membership.link_ids(EntityKind::ArtistDevelopment).is_empty());
        assert!(membership.governing_principal().is_none());
    }

    #[test]
    fn unknown_status_falls_back_to_applicant() {
        let membership: Membership = serde_json::from_value(json!({
            "profile": { "id": "m-2", "status": "suspended" }
        }))
        .expect("membership should decode");
        assert_eq!(membership.profile.status, MemberStatus::Applicant);
    }

    #[test]
    fn profile_update_checks_name_and_email() {
        let update = MembershipUpdate {
            id: "m-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
            status: MemberStatus::Active,
        };
        assert_eq!(update.validate(), Ok(()));
        assert_eq!(
            MembershipUpdate {
                name: " ".to_string(),
                ..update.clone()
            }
            .validate(),
            Err(ValidationError::BlankField("name"))
        );
        assert!(MembershipUpdate {
            email: "ada".to_string(),
            ..update
        }
        .validate()
        .is_err());
    }
}
