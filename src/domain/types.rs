//! Strongly typed domain primitives for the process engine.
//!
//! Enums serialize as lowercase strings so persisted blobs stay readable and
//! compatible with what the UI layer has always written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp for entities and timeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampUtc(pub DateTime<Utc>);

impl TimestampUtc {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the timestamp as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Milliseconds since the Unix epoch, used in synthetic ids.
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Default for TimestampUtc {
    fn default() -> Self {
        Self::now()
    }
}

/// Life category used to tag users and processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Health,
    Finance,
    Knowledge,
    Business,
}

impl Lens {
    pub const ALL: [Lens; 4] = [Lens::Health, Lens::Finance, Lens::Knowledge, Lens::Business];

    /// Human-readable label, used as the first segment of a process summary.
    pub fn label(&self) -> &'static str {
        match self {
            Lens::Health => "Health",
            Lens::Finance => "Finance",
            Lens::Knowledge => "Knowledge",
            Lens::Business => "Business",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lens::Health => "health",
            Lens::Finance => "finance",
            Lens::Knowledge => "knowledge",
            Lens::Business => "business",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }

    /// The hat that grants the agent this lens as a capability.
    pub fn hat(&self) -> Hat {
        match self {
            Lens::Health => Hat::Health,
            Lens::Finance => Hat::Finance,
            Lens::Knowledge => Hat::Knowledge,
            Lens::Business => Hat::Business,
        }
    }
}

impl std::fmt::Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tone of the personal agent, chosen at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Friendly,
    Professional,
    Neutral,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Friendly => "Friendly",
            Persona::Professional => "Professional",
            Persona::Neutral => "Neutral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "friendly" => Some(Persona::Friendly),
            "professional" => Some(Persona::Professional),
            "neutral" => Some(Persona::Neutral),
            _ => None,
        }
    }
}

/// Agent capability tag. One agent, many hats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hat {
    Base,
    Health,
    Finance,
    Knowledge,
    Business,
    Provider,
}

impl Hat {
    pub const ALL: [Hat; 6] = [
        Hat::Base,
        Hat::Health,
        Hat::Finance,
        Hat::Knowledge,
        Hat::Business,
        Hat::Provider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hat::Base => "base",
            Hat::Health => "health",
            Hat::Finance => "finance",
            Hat::Knowledge => "knowledge",
            Hat::Business => "business",
            Hat::Provider => "provider",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Hat::Base => "Base",
            Hat::Health => "Health",
            Hat::Finance => "Finance",
            Hat::Knowledge => "Knowledge",
            Hat::Business => "Business",
            Hat::Provider => "Provider",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == s)
    }
}

impl std::fmt::Display for Hat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Author of a process message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

/// Lifecycle status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    #[default]
    Active,
    Done,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Active => "active",
            ProcessStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProcessStatus::Active),
            "done" => Some(ProcessStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of entry recorded on a process timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessEventType {
    Note,
    Compile,
    Status,
    FieldUpdate,
}
