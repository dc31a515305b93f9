//! Portal-level error taxonomy.
//!
//! # Invariants
//! - Data-shape problems never reach this type; they are absorbed by
//!   `normalize`.
//! - Every variant maps to one human-readable message for display.
//! - Nothing here is fatal to the application; the worst case is one
//!   degraded view.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::backend::BackendError;
use crate::links::LinkValidationError;
use crate::model::{EntityRef, IdentityError, ValidationError};

pub type PortalResult<T> = Result<T, PortalError>;

/// Errors surfaced by portal operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Caller lacks permission; local state is unchanged.
    Unauthorized(String),
    /// Referenced record no longer resolves.
    NotFound(EntityRef),
    /// Other backend failures, including transient unavailability.
    Backend(BackendError),
    /// Creation request failed client-side validation.
    Validation(ValidationError),
    /// Link update failed client-side validation.
    InvalidLinks(LinkValidationError),
    /// Identity could not be resolved or parsed.
    Identity(IdentityError),
    /// A link mutation for this anchor is already in flight.
    EditInProgress(EntityRef),
    /// No link editor is open, or no submission is in flight.
    EditorClosed,
}

impl PortalError {
    /// Returns whether the failure may clear on an explicit retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Unavailable(_)))
    }

    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Backend(BackendError::Unavailable(_)) => "unavailable",
            Self::Backend(_) => "backend_rejected",
            Self::Validation(_) => "validation",
            Self::InvalidLinks(_) => "invalid_links",
            Self::Identity(_) => "identity",
            Self::EditInProgress(_) => "edit_in_progress",
            Self::EditorClosed => "editor_closed",
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => {
                "You do not have permission to change this record.".to_string()
            }
            Self::NotFound(entity) => format!(
                "This {} record could not be found. It may have been removed.",
                entity.kind.section_label().trim_end_matches('s').to_lowercase()
            ),
            Self::Backend(BackendError::Unavailable(_)) => {
                "The portal service is unavailable right now. Please try again.".to_string()
            }
            Self::Backend(err) => format!("The change was rejected: {err}."),
            Self::Validation(err) => format!("Please fix the form: {err}."),
            Self::InvalidLinks(err) => format!("These links cannot be saved: {err}."),
            Self::Identity(_) => "Please sign in again to continue.".to_string(),
            Self::EditInProgress(_) => "Links are still being saved.".to_string(),
            Self::EditorClosed => "The link editor is not open.".to_string(),
        }
    }
}

impl Display for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(details) => write!(f, "unauthorized: {details}"),
            Self::NotFound(entity) => write!(f, "record not found: {entity}"),
            Self::Backend(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidLinks(err) => write!(f, "{err}"),
            Self::Identity(err) => write!(f, "{err}"),
            Self::EditInProgress(anchor) => write!(f, "link edit already in flight for {anchor}"),
            Self::EditorClosed => write!(f, "link editor is not open"),
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidLinks(err) => Some(err),
            Self::Identity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for PortalError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Unauthorized(details) => Self::Unauthorized(details),
            BackendError::NotFound(entity) => Self::NotFound(entity),
            other => Self::Backend(other),
        }
    }
}

impl From<ValidationError> for PortalError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LinkValidationError> for PortalError {
    fn from(value: LinkValidationError) -> Self {
        Self::InvalidLinks(value)
    }
}

impl From<IdentityError> for PortalError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}
