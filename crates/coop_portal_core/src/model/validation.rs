//! Client-side validation for creation requests.
//!
//! # Invariants
//! - Validation runs before any backend write; it never reads backend state.
//! - Ownership splits: at least one entry, no negative entry, total in 0..=100.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

use super::publishing::OwnershipSplit;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Maximum total for ownership splits, in percent.
pub const MAX_SPLIT_TOTAL: i64 = 100;

/// Validation failures for creation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Email does not look like an address.
    InvalidEmail(String),
    /// No ownership split was provided.
    EmptyOwnershipSplits,
    /// One split entry carries a negative percentage.
    NegativeSplit { contributor: String, percentage: i64 },
    /// Splits add up to more than 100%.
    SplitTotalExceeded { total: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::EmptyOwnershipSplits => write!(f, "at least one ownership split is required"),
            Self::NegativeSplit {
                contributor,
                percentage,
            } => write!(
                f,
                "ownership split for `{contributor}` cannot be negative ({percentage}%)"
            ),
            Self::SplitTotalExceeded { total } => write!(
                f,
                "ownership splits total {total}% which exceeds {MAX_SPLIT_TOTAL}%"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Validates ownership splits for a new publishing work.
pub fn validate_ownership_splits(splits: &[OwnershipSplit]) -> Result<(), ValidationError> {
    if splits.is_empty() {
        return Err(ValidationError::EmptyOwnershipSplits);
    }

    if let Some(negative) = splits.iter().find(|split| split.percentage < 0) {
        return Err(ValidationError::NegativeSplit {
            contributor: negative.contributor.clone(),
            percentage: negative.percentage,
        });
    }

    let total = splits
        .iter()
        .fold(0_i64, |sum, split| sum.saturating_add(split.percentage));
    if total > MAX_SPLIT_TOTAL {
        return Err(ValidationError::SplitTotalExceeded { total });
    }

    Ok(())
}

/// Rejects blank required text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Shallow email shape check.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(())
}
