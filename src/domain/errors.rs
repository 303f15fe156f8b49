//! Error types for the process engine.

use std::fmt::{Display, Formatter};

/// Errors that can occur while executing a store operation.
///
/// Expected edge cases (unknown process, missing user, rejected onboarding)
/// are not errors; they come back as a skipped outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Writing the serialized state to the key-value store failed.
    /// The in-memory snapshot was not advanced.
    PersistenceUnavailable { message: String },
    /// The store actor is not running (disposed or crashed).
    EngineStopped,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersistenceUnavailable { message } => {
                write!(f, "persistence unavailable: {}", message)
            }
            Self::EngineStopped => write!(f, "process engine is not running"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Why onboarding answers were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingRejection {
    EmptyName,
    MissingPersona,
    NoLens,
    TooManyLenses,
}

impl Display for OnboardingRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is empty"),
            Self::MissingPersona => write!(f, "persona is not set"),
            Self::NoLens => write!(f, "no lens selected"),
            Self::TooManyLenses => write!(f, "more than three lenses selected"),
        }
    }
}
