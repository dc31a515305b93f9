//! Core domain logic for the co-operative portal.
//! This crate is the single source of truth for the cross-entity link model,
//! its update protocol and its permission rules.

pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod links;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod normalize;
pub mod options;
pub mod permissions;
pub mod session;

pub use backend::{BackendError, BackendResult, MemoryBackend, PortalBackend};
pub use cache::{CacheKey, QueryCache, QueryState};
pub use client::PortalClient;
pub use config::{ConfigError, PortalConfig};
pub use error::{PortalError, PortalResult};
pub use links::{LinkEdge, LinkSet, LinkSets, LinkUpdate, LinkValidationError, RelationshipGraph};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    ApprovalInfo, ApprovalStatus, ArtistDevelopment, CallerEntities, CallerIdentity, EntityKind,
    EntityRecord, EntityRef, Identity, IdentityError, LinkedRecord, MemberStatus, Membership,
    MembershipProfile, MembershipUpdate, NewArtistDevelopment, NewMembership, NewPublishingWork,
    NewRecordingProject, NewRelease, OwnershipSplit, Principal, ProjectStatus, PublishingWork,
    RecordingProject, Release, Role, ValidationError,
};
pub use mutation::{affected_keys, EditorState, LinkEditor};
pub use normalize::{is_non_empty, normalize_to_vec, safe_len};
pub use options::{label_or_id, resolve_options, EntityOption, LinkableOptions, RelatedLabels};
pub use permissions::{can_edit, resolve_edit, DenyReason, EditDecision};
pub use session::{AccessDecision, IdentityProvider, SessionContext, StaticIdentityProvider};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
