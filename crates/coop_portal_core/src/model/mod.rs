//! Domain model for the co-operative portal.
//!
//! # Responsibility
//! - Define the five linkable record types and their creation requests.
//! - Define caller identity, role and approval types.
//!
//! # Invariants
//! - Every record is identified by an opaque string ID, unique per kind.
//! - Decoding never fails on missing or mistyped fields; see `normalize`.
//! - Records are never deleted in this core.

pub mod artist;
pub mod identity;
pub mod kind;
pub mod membership;
pub mod project;
pub mod publishing;
pub mod record;
pub mod release;
pub mod validation;

pub use artist::{ArtistDevelopment, NewArtistDevelopment};
pub use identity::{
    ApprovalInfo, ApprovalStatus, CallerIdentity, Identity, IdentityError, Principal, Role,
};
pub use kind::{
    ArtistDevelopmentId, EntityKind, EntityRef, MemberId, ProjectId, PublishingId, ReleaseId,
};
pub use membership::{
    MemberStatus, Membership, MembershipProfile, MembershipTier, MembershipUpdate, NewMembership,
};
pub use project::{NewRecordingProject, ProjectStatus, RecordingProject};
pub use publishing::{NewPublishingWork, OwnershipSplit, PublishingWork};
pub use record::{CallerEntities, EntityRecord, LinkedRecord};
pub use release::{NewRelease, Release};
pub use validation::{validate_ownership_splits, ValidationError};
