//! Load-time normalization of persisted aggregates.
//!
//! There is no schema versioning for the stored user blob, so older or
//! partial shapes are tolerated here: unknown hats are dropped, `base` is
//! forced in, and null slots fall back to their defaults.

use crate::domain::entities::User;
use crate::domain::types::Hat;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deduplicates `hats` preserving order and puts `base` first if missing.
pub fn normalize_hats(hats: Vec<Hat>) -> Vec<Hat> {
    let mut out: Vec<Hat> = Vec::with_capacity(hats.len() + 1);
    for hat in hats {
        if !out.contains(&hat) {
            out.push(hat);
        }
    }
    if !out.contains(&Hat::Base) {
        out.insert(0, Hat::Base);
    }
    out
}

/// Accepts any JSON for the hats slot and keeps only known tags.
///
/// A non-array value yields `[base]`.
pub(crate) fn deserialize_hats<'de, D>(deserializer: D) -> Result<Vec<Hat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let hats = match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().and_then(Hat::parse))
            .collect(),
        _ => Vec::new(),
    };
    Ok(normalize_hats(hats))
}

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a stored user blob.
///
/// Returns `None` for anything that does not parse; the caller treats that as
/// a fresh install rather than an error.
pub fn parse_stored_user(raw: &str) -> Option<User> {
    match serde_json::from_str::<User>(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Discarding unparsable stored user: {}", e);
            None
        }
    }
}
