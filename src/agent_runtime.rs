//! Agent replies to user notes.
//!
//! Only an offline runtime ships. It never calls out to a model.

use crate::domain::{FieldsPatch, Process, User};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Text of every local acknowledgement.
pub const LOCAL_REPLY: &str = "Noted. (Agent runs locally; compile to refresh the card.)";

#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub text: String,
    pub suggested_fields: Option<FieldsPatch>,
}

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn reply(&self, user: &User, process: &Process, text: &str) -> AgentReply;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRuntime;

fn leading_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:next|todo)\s*:?\s*").ok())
        .as_ref()
}

impl LocalRuntime {
    /// `[rest]` as next steps when the note opens with `next:` or `todo:`.
    pub fn suggest(text: &str) -> Option<FieldsPatch> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();
        if !(lower.starts_with("next:") || lower.starts_with("todo:")) {
            return None;
        }
        let rest = leading_marker()?.replace(trimmed, "").trim().to_string();
        if rest.is_empty() {
            return None;
        }
        Some(FieldsPatch {
            next_steps: Some(vec![rest]),
            ..FieldsPatch::default()
        })
    }
}

#[async_trait]
impl AgentRuntime for LocalRuntime {
    async fn reply(&self, _user: &User, process: &Process, text: &str) -> AgentReply {
        tracing::debug!("Local agent reply for process {}", process.id);
        AgentReply {
            text: LOCAL_REPLY.to_string(),
            suggested_fields: Self::suggest(text),
        }
    }
}
