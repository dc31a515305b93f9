//! Remote backend contract.
//!
//! # Responsibility
//! - Describe the operations the portal core consumes from the data backend.
//! - Keep transport details out of the core; implementors own them.
//!
//! # Invariants
//! - `update_links` is a full replacement per kind, never a merge.
//! - The backend writes reverse links; callers re-fetch to observe them.
//! - Every method resolves once; the core never retries automatically.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::links::LinkUpdate;
use crate::model::{
    ApprovalInfo, ApprovalStatus, ArtistDevelopment, CallerEntities, EntityKind, EntityRecord,
    EntityRef, MembershipProfile, MembershipUpdate, NewArtistDevelopment, NewMembership,
    NewPublishingWork, NewRecordingProject, NewRelease, Principal, PublishingWork,
    RecordingProject, Release, Role,
};

pub mod memory;

pub use memory::MemoryBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failures reported by the backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Caller lacks permission for the operation.
    Unauthorized(String),
    /// Referenced record does not exist.
    NotFound(EntityRef),
    /// A link target does not resolve.
    InvalidTarget(EntityRef),
    /// Request rejected for another stated reason.
    Rejected(String),
    /// Network or service failure.
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(details) => write!(f, "unauthorized: {details}"),
            Self::NotFound(entity) => write!(f, "record not found: {entity}"),
            Self::InvalidTarget(entity) => write!(f, "link target does not exist: {entity}"),
            Self::Rejected(details) => write!(f, "request rejected: {details}"),
            Self::Unavailable(details) => write!(f, "backend unavailable: {details}"),
        }
    }
}

impl Error for BackendError {}

/// Operations consumed from the data backend on behalf of one caller.
pub trait PortalBackend {
    fn caller_role(&self) -> BackendResult<Role>;
    fn is_caller_approved(&self) -> BackendResult<bool>;
    fn request_approval(&self) -> BackendResult<()>;
    fn list_approvals(&self) -> BackendResult<Vec<ApprovalInfo>>;
    fn set_approval(&self, principal: &Principal, status: ApprovalStatus) -> BackendResult<()>;
    fn assign_role(&self, principal: &Principal, role: Role) -> BackendResult<()>;

    /// Every record of `kind`; admin-scoped.
    fn list_all(&self, kind: EntityKind) -> BackendResult<Vec<EntityRecord>>;
    fn get_record(&self, entity: &EntityRef) -> BackendResult<EntityRecord>;
    /// Records visible to the caller, as one request.
    fn entities_for_caller(&self) -> BackendResult<CallerEntities>;

    fn create_membership(&self, request: &NewMembership) -> BackendResult<MembershipProfile>;
    fn create_publishing_work(&self, request: &NewPublishingWork) -> BackendResult<PublishingWork>;
    fn create_release(&self, request: &NewRelease) -> BackendResult<Release>;
    fn create_recording_project(
        &self,
        request: &NewRecordingProject,
    ) -> BackendResult<RecordingProject>;
    fn create_artist_development(
        &self,
        request: &NewArtistDevelopment,
    ) -> BackendResult<ArtistDevelopment>;

    /// Rewrites name, email and status of a membership; owner or admin only.
    fn update_membership_profile(
        &self,
        update: &MembershipUpdate,
    ) -> BackendResult<MembershipProfile>;
    /// Replaces the notes of a publishing work; owner or admin only.
    fn add_publishing_work_notes(&self, id: &str, notes: &str) -> BackendResult<()>;

    /// Replaces every link set of the update's anchor.
    fn update_links(&self, update: &LinkUpdate) -> BackendResult<()>;
}
