//! Directory-backed key-value store.
//!
//! Each key lives in `<dir>/<key>.kv`. Writes go through a temp file and a
//! rename, under an exclusive advisory lock on `<dir>/.lock` so two engine
//! processes sharing a data directory never interleave a write.

use super::{validate_key, KeyValueStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".lock";
const VALUE_EXTENSION: &str = "kv";

#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn value_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || read_value(&dir, &path))
            .await
            .context("key-value read task failed")?
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let dir = self.dir.clone();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || write_value(&dir, &path, &value))
            .await
            .context("key-value write task failed")?
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || remove_value(&dir, &path))
            .await
            .context("key-value remove task failed")?
    }
}

fn open_lock(dir: &Path) -> Result<File> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    let lock_path = dir.join(LOCK_FILE);
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))
}

fn read_value(dir: &Path, path: &Path) -> Result<Option<String>> {
    if !dir.exists() {
        return Ok(None);
    }
    let lock = open_lock(dir)?;
    lock.lock_shared()
        .with_context(|| format!("Failed to lock {}", dir.display()))?;

    let result = match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let _ = lock.unlock();
    result
}

fn write_value(dir: &Path, path: &Path, value: &str) -> Result<()> {
    let lock = open_lock(dir)?;
    lock.lock_exclusive()
        .with_context(|| format!("Failed to lock {}", dir.display()))?;

    let result = write_atomic(path, value);

    let _ = lock.unlock();
    result
}

fn write_atomic(path: &Path, value: &str) -> Result<()> {
    let tmp_path = path.with_extension(format!("{}.tmp", VALUE_EXTENSION));
    {
        let mut file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        file.write_all(value.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
    }
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move value into {}", path.display()))
}

fn remove_value(dir: &Path, path: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let lock = open_lock(dir)?;
    lock.lock_exclusive()
        .with_context(|| format!("Failed to lock {}", dir.display()))?;

    let result = match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    };

    let _ = lock.unlock();
    result
}

#[cfg(test)]
#[path = "tests/file_store_tests.rs"]
mod tests;
