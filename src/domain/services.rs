//! External services for the process engine.
//!
//! Services provide external dependencies (time, id generation) to the
//! store and compiler without coupling them to specific implementations.

use crate::domain::entities::{ProcessEvent, ProcessMessage};
use crate::domain::ids::{generate_id, IdPrefix};
use crate::domain::types::{ProcessEventType, Sender, TimestampUtc};
use serde_json::{Map, Value};

/// Services injected into the store and compiler.
#[derive(Debug, Clone, Default)]
pub struct EngineServices {
    pub clock: EngineClock,
}

impl EngineServices {
    /// Services whose clock always reports `at`.
    pub fn with_fixed_clock(at: TimestampUtc) -> Self {
        Self {
            clock: EngineClock::fixed(at),
        }
    }

    pub fn new_id(&self, prefix: IdPrefix) -> String {
        generate_id(prefix, &self.clock.now())
    }

    /// Builds a timeline event stamped now.
    pub fn new_event(
        &self,
        event_type: ProcessEventType,
        payload: Map<String, Value>,
    ) -> ProcessEvent {
        let at = self.clock.now();
        ProcessEvent {
            id: generate_id(IdPrefix::Event, &at),
            at,
            event_type,
            payload,
        }
    }

    /// Builds a message stamped now.
    pub fn new_message(&self, sender: Sender, text: &str) -> ProcessMessage {
        let created_at = self.clock.now();
        ProcessMessage {
            id: generate_id(IdPrefix::Message, &created_at),
            sender,
            text: text.to_string(),
            created_at,
        }
    }
}

/// Clock service for timestamp generation.
#[derive(Debug, Clone, Default)]
pub struct EngineClock {
    fixed: Option<TimestampUtc>,
}

impl EngineClock {
    /// A clock frozen at `at`.
    pub fn fixed(at: TimestampUtc) -> Self {
        Self { fixed: Some(at) }
    }

    /// Returns the current UTC timestamp.
    pub fn now(&self) -> TimestampUtc {
        self.fixed.unwrap_or_else(TimestampUtc::now)
    }
}
