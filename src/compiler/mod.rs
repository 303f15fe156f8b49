//! Rule-based compiler: turns a process's recent notes into card fields.
//!
//! `compile_process` is total. It never fails, never touches messages or
//! existing events, and never changes id, title, lens, creation time or
//! status. Each pass appends exactly one `compile` event.
//!
//! Derived slots (`context`, `nextSteps`, `constraints`, `risks`) only
//! overwrite the prior value when the new derivation is non-empty, so a
//! compile over unrelated notes never regresses a populated slot.

pub mod rules;

use crate::domain::{EngineServices, Process, ProcessEventType, ProcessFields};
use serde_json::{Map, Value};

/// Number of most recent user notes the compiler reads.
pub const COMPILE_WINDOW: usize = 10;
/// Characters of the summary carried in the compile event payload.
pub const SUMMARY_PAYLOAD_CHARS: usize = 80;
/// Separator between summary parts.
pub const SUMMARY_SEPARATOR: &str = " • ";

/// Compiles `process` into a new process value with refreshed fields,
/// summary and one extra `compile` event.
pub fn compile_process(process: &Process, services: &EngineServices) -> Process {
    let window: Vec<&str> = process
        .recent_user_messages(COMPILE_WINDOW)
        .into_iter()
        .map(|m| m.text.as_str())
        .collect();

    let fields = merge_fields(
        &process.fields,
        rules::build_context(&window),
        rules::extract_next_steps(&window),
        rules::extract_constraints(&window),
        rules::extract_risks(&window),
    );
    let summary = build_summary(process, &fields);

    let mut payload = Map::new();
    payload.insert(
        "summary".to_string(),
        Value::String(rules::truncate_chars(&summary, SUMMARY_PAYLOAD_CHARS)),
    );

    let mut compiled = Process {
        fields,
        summary,
        ..process.clone()
    };
    compiled
        .timeline
        .push(services.new_event(ProcessEventType::Compile, payload));
    compiled
}

fn non_empty_list(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn merge_fields(
    prior: &ProcessFields,
    context: String,
    next_steps: Vec<String>,
    constraints: Vec<String>,
    risks: Vec<String>,
) -> ProcessFields {
    let context = if context.is_empty() { None } else { Some(context) };
    ProcessFields {
        context: context.or_else(|| prior.context.clone()),
        next_steps: non_empty_list(next_steps).or_else(|| prior.next_steps.clone()),
        constraints: non_empty_list(constraints).or_else(|| prior.constraints.clone()),
        risks: non_empty_list(risks).or_else(|| prior.risks.clone()),
        ..prior.clone()
    }
}

/// `"<Lens label> • <status> • <highlight>"`.
///
/// Highlight falls back from the first next step to the goal to the title.
pub fn build_summary(process: &Process, fields: &ProcessFields) -> String {
    let first_step = fields
        .next_steps
        .as_ref()
        .and_then(|steps| steps.first())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let goal = fields
        .goal
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty());
    let highlight = first_step.or(goal).unwrap_or(process.title.as_str());

    [process.lens.label(), process.status.as_str(), highlight].join(SUMMARY_SEPARATOR)
}

#[cfg(test)]
#[path = "tests/compiler_tests.rs"]
mod tests;
