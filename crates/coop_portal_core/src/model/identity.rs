//! Caller identity, roles and approval state.
//!
//! # Invariants
//! - Permission checks compare principals, never names or emails.
//! - A caller whose principal cannot be resolved is treated as unknown.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static PRINCIPAL_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z2-7]{1,5}(-[a-z2-7]{1,5})*$").expect("valid principal regex")
});

/// Textual principal of an identity.
///
/// Values decoded from the backend are trusted as-is; values typed in by a
/// user go through [`Principal::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Parses user-entered principal text.
    ///
    /// Input is trimmed; groups of lowercase base32 characters separated by
    /// `-` are accepted.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let trimmed = text.trim();
        if !PRINCIPAL_TEXT_RE.is_match(trimmed) {
            return Err(IdentityError::InvalidPrincipal(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps principal text received from a trusted source.
    pub fn from_trusted(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Portal role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    #[default]
    Guest,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

/// Approval workflow status for non-admin callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// One entry of the approval queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    pub principal: Principal,
    pub status: ApprovalStatus,
}

/// Source of the caller's principal.
///
/// Resolution may fail (expired delegation, detached agent); callers of this
/// trait must treat a failure as "unknown caller".
pub trait CallerIdentity {
    fn principal(&self) -> Result<Principal, IdentityError>;
}

/// Signed-in identity with a resolved principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    principal: Principal,
}

impl Identity {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal_ref(&self) -> &Principal {
        &self.principal
    }
}

impl CallerIdentity for Identity {
    fn principal(&self) -> Result<Principal, IdentityError> {
        Ok(self.principal.clone())
    }
}

/// Identity resolution and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Principal text does not match the textual principal format.
    InvalidPrincipal(String),
    /// The identity provider could not produce a principal.
    Unavailable(String),
    /// Login was cancelled or rejected by the provider.
    LoginFailed(String),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrincipal(value) => write!(f, "invalid principal: `{value}`"),
            Self::Unavailable(details) => write!(f, "identity unavailable: {details}"),
            Self::LoginFailed(details) => write!(f, "login failed: {details}"),
        }
    }
}

impl Error for IdentityError {}
