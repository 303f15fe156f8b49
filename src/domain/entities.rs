//! Entity model: the user aggregate and everything it owns.
//!
//! The user exclusively owns its agent and processes; processes own their
//! messages, fields and timeline. There are no back-references.

use crate::domain::normalize::{deserialize_hats, normalize_hats, null_as_default};
use crate::domain::types::{
    Hat, Lens, Persona, ProcessEventType, ProcessStatus, Sender, TimestampUtc,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root aggregate: one user, one agent, lenses, processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub lenses: Vec<Lens>,
    pub agent: Agent,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processes: Vec<Process>,
    /// Keys written by other clients, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn process(&self, id: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.id == id)
    }

    pub fn has_process(&self, id: &str) -> bool {
        self.process(id).is_some()
    }

    /// Returns a copy of the user with `f` applied to the process named `id`.
    ///
    /// Every other process is carried over untouched. Returns `None` when no
    /// process has that id.
    pub fn with_process<F>(&self, id: &str, f: F) -> Option<User>
    where
        F: FnOnce(&Process) -> Process,
    {
        let index = self.processes.iter().position(|p| p.id == id)?;
        let mut next = self.clone();
        next.processes[index] = f(&self.processes[index]);
        Some(next)
    }
}

/// The user's single personal agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub persona: Persona,
    #[serde(default = "default_hats", deserialize_with = "deserialize_hats")]
    pub hats: Vec<Hat>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Agent {
    /// Returns a copy of the agent wearing `hats`, always including `base`.
    pub fn with_hats(&self, hats: Vec<Hat>) -> Agent {
        Agent {
            hats: normalize_hats(hats),
            ..self.clone()
        }
    }

    pub fn wears(&self, hat: Hat) -> bool {
        self.hats.contains(&hat)
    }
}

fn default_hats() -> Vec<Hat> {
    vec![Hat::Base]
}

/// Process = main unit. Messages + compiler produce the card fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub title: String,
    pub lens: Lens,
    #[serde(default)]
    pub status: ProcessStatus,
    pub created_at: TimestampUtc,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ProcessMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: ProcessFields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Timeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<ProcessStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<ProcessReality>,
    /// Keys written by other clients, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Process {
    /// The most recent `limit` user-authored messages, oldest first.
    pub fn recent_user_messages(&self, limit: usize) -> Vec<&ProcessMessage> {
        let notes: Vec<&ProcessMessage> = self
            .messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .collect();
        let skip = notes.len().saturating_sub(limit);
        notes.into_iter().skip(skip).collect()
    }

    pub fn is_done(&self) -> bool {
        self.status == ProcessStatus::Done
    }
}

/// One checklist item of a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub order: u32,
}

/// Expected cost, time and resources against the user's own targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_nis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cost_nis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time_days: Option<f64>,
}

/// A note or reply attached to a process. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub created_at: TimestampUtc,
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEvent {
    pub id: String,
    pub at: TimestampUtc,
    #[serde(rename = "type")]
    pub event_type: ProcessEventType,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// Append-only log of process events.
///
/// `push` is the only mutator: entries can never be edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(Vec<ProcessEvent>);

impl Timeline {
    pub fn push(&mut self, event: ProcessEvent) {
        self.0.push(event);
    }

    pub fn events(&self) -> &[ProcessEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&ProcessEvent> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessEvent> {
        self.0.iter()
    }

    /// Number of events of the given type.
    pub fn count_of(&self, event_type: ProcessEventType) -> usize {
        self.0.iter().filter(|e| e.event_type == event_type).count()
    }
}

impl From<Vec<ProcessEvent>> for Timeline {
    fn from(events: Vec<ProcessEvent>) -> Self {
        Self(events)
    }
}

/// Card fields compiled from notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

/// Partial update of [`ProcessFields`]: every `Some` slot overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl FieldsPatch {
    pub fn is_empty(&self) -> bool {
        self.slot_names().is_empty()
    }

    /// Names of the slots this patch touches, in wire form.
    pub fn slot_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.goal.is_some() {
            names.push("goal");
        }
        if self.context.is_some() {
            names.push("context");
        }
        if self.constraints.is_some() {
            names.push("constraints");
        }
        if self.next_steps.is_some() {
            names.push("nextSteps");
        }
        if self.risks.is_some() {
            names.push("risks");
        }
        if self.resources.is_some() {
            names.push("resources");
        }
        if self.outcome.is_some() {
            names.push("outcome");
        }
        names
    }

    /// Applies the patch on top of `fields`.
    pub fn apply_to(&self, fields: &ProcessFields) -> ProcessFields {
        let mut next = fields.clone();
        if let Some(goal) = &self.goal {
            next.goal = Some(goal.clone());
        }
        if let Some(context) = &self.context {
            next.context = Some(context.clone());
        }
        if let Some(constraints) = &self.constraints {
            next.constraints = Some(constraints.clone());
        }
        if let Some(next_steps) = &self.next_steps {
            next.next_steps = Some(next_steps.clone());
        }
        if let Some(risks) = &self.risks {
            next.risks = Some(risks.clone());
        }
        if let Some(resources) = &self.resources {
            next.resources = Some(resources.clone());
        }
        if let Some(outcome) = &self.outcome {
            next.outcome = Some(outcome.clone());
        }
        next
    }
}

#[cfg(test)]
#[path = "tests/entities_tests.rs"]
mod tests;
