//! Boundary normalization for externally sourced entity data.
//!
//! # Responsibility
//! - Coerce sequence-shaped fields into well-formed `Vec<T>` values.
//! - Provide serde adapters so every decoded record is normalized on entry.
//!
//! # Invariants
//! - Every function here is total: absent, null and wrongly typed input
//!   degrade to an empty/default value and never produce an error.
//! - A valid array whose elements all decode is returned unchanged.
//! - Elements that fail to decode are dropped individually.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::Principal;

/// Normalizes a maybe-sequence into a `Vec<T>`.
///
/// Returns an empty vector for absent, null and non-array input.
pub fn normalize_to_vec<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let normalized: Vec<T> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if normalized.len() != items.len() {
        debug!(
            "event=normalize_drop module=normalize status=ok dropped={} kept={}",
            items.len() - normalized.len(),
            normalized.len()
        );
    }
    normalized
}

/// Returns whether `value` is an array with at least one element.
pub fn is_non_empty(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Array(items)) if !items.is_empty())
}

/// Array length, treating anything that is not an array as zero.
pub fn safe_len(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    }
}

/// Serde adapter for sequence fields: use with `#[serde(default, deserialize_with = ...)]`.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize_to_vec(raw.as_ref()))
}

/// Serde adapter for scalar fields that fall back to `T::default()`.
pub fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}

/// Serde adapter for optional fields; undecodable values become `None`.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Serde adapter for owner principals; blank or undecodable text becomes `None`.
pub fn lenient_principal<'de, D>(deserializer: D) -> Result<Option<Principal>, D::Error>
where
    D: Deserializer<'de>,
{
    let principal: Option<Principal> = lenient_option(deserializer)?;
    Ok(principal.filter(|principal| !principal.as_str().trim().is_empty()))
}
