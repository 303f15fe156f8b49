//! App-level preferences stored next to the user aggregate.
//!
//! Reads never fail: a missing, unreadable or unknown value falls back to
//! the default. Writes propagate backend errors.

use crate::kv::{KeyValueStore, LOADING_COMPLETED_KEY, THEME_PREFERENCE_KEY};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Auto,
    Light,
    Dark,
}

/// The concrete scheme after resolving `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Auto => "auto",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "auto" => Some(ThemePreference::Auto),
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub fn resolve(&self, system_prefers_dark: bool) -> ColorScheme {
        match self {
            ThemePreference::Light => ColorScheme::Light,
            ThemePreference::Dark => ColorScheme::Dark,
            ThemePreference::Auto if system_prefers_dark => ColorScheme::Dark,
            ThemePreference::Auto => ColorScheme::Light,
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

#[derive(Clone)]
pub struct AppSettings {
    kv: Arc<dyn KeyValueStore>,
}

impl AppSettings {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Whether the intro sequence has already been shown.
    pub async fn loading_completed(&self) -> bool {
        match self.kv.get(LOADING_COMPLETED_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("Failed to read intro flag: {}", e);
                false
            }
        }
    }

    pub async fn set_loading_completed(&self) -> Result<()> {
        self.kv.set(LOADING_COMPLETED_KEY, "true").await
    }

    pub async fn theme_preference(&self) -> ThemePreference {
        match self.kv.get(THEME_PREFERENCE_KEY).await {
            Ok(Some(raw)) => ThemePreference::parse(&raw).unwrap_or_else(|| {
                tracing::debug!("Unknown theme preference {:?}, using auto", raw);
                ThemePreference::default()
            }),
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                ThemePreference::default()
            }
        }
    }

    pub async fn set_theme_preference(&self, preference: ThemePreference) -> Result<()> {
        self.kv.set(THEME_PREFERENCE_KEY, preference.as_str()).await
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
