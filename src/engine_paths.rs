//! Home-based storage paths for the engine.
//!
//! Everything lives under one directory, `$ONE01_HOME` when set and
//! `~/.one01/` otherwise:
//! - `data/` - Key-value files (user aggregate, intro flag, theme)
//! - `logs/` - Structured JSONL log
//! - `config.yaml` - Optional configuration override

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "ONE01_HOME";

const ENGINE_DIR: &str = ".one01";

/// Returns the engine home directory, creating it if needed.
///
/// # Errors
///
/// Returns an error if:
/// - `$ONE01_HOME` is unset and the home directory cannot be determined
/// - Directory creation fails
pub fn engine_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .context("Could not determine home directory for engine storage")?
            .join(ENGINE_DIR),
    };
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Returns the key-value data directory: `<home>/data/`
pub fn data_dir() -> Result<PathBuf> {
    let dir = engine_home_dir()?.join("data");
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Returns the logs directory: `<home>/logs/`
pub fn logs_dir() -> Result<PathBuf> {
    let dir = engine_home_dir()?.join("logs");
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Returns the user config path: `<home>/config.yaml`. The file may not exist.
pub fn config_path() -> Result<PathBuf> {
    Ok(engine_home_dir()?.join("config.yaml"))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(test)]
#[path = "engine_paths_tests.rs"]
mod tests;
