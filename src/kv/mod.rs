//! Persistent key-value backends.
//!
//! The engine persists three string values: the serialized user aggregate,
//! the intro flag and the theme preference. Any backend implementing
//! [`KeyValueStore`] can hold them.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileKvStore;
pub use memory_store::MemoryKvStore;

use anyhow::{bail, Result};
use async_trait::async_trait;

/// Key of the serialized user aggregate.
pub const USER_KEY: &str = "one_user";
/// Key of the intro-shown flag.
pub const LOADING_COMPLETED_KEY: &str = "one_loading_completed";
/// Key of the theme preference.
pub const THEME_PREFERENCE_KEY: &str = "one_theme_preference";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Rejects keys that would not map to a single safe file name.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." {
        bail!("invalid key {:?}", key);
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
    {
        bail!("invalid character {:?} in key {:?}", c, key);
    }
    Ok(())
}
