//! Pure state transitions for the process store.
//!
//! `plan` never performs I/O. It computes the next user from the current
//! one and a command, touching only the affected process or agent. The
//! actor persists and publishes whatever plan comes back.

use crate::catalog::{ProtocolCatalog, ProviderDirectory};
use crate::compiler::{compile_process, rules::truncate_chars};
use crate::domain::onboarding::{build_user, new_process};
use crate::domain::{
    EngineServices, FieldsPatch, Process, ProcessEventType, ProcessStatus, Sender, User,
};
use crate::store::commands::{MutationOutcome, SkipReason, StoreCommand, StoreNotification};
use serde_json::{json, Map, Value};

/// Characters of a note copied into its timeline event.
pub const NOTE_PREVIEW_CHARS: usize = 100;
/// Prefix of the resource entry recorded for an attached collaborator.
pub const PROVIDER_RESOURCE_PREFIX: &str = "Provider: ";

/// Collaborators the planner reads from.
pub struct MutationContext<'a> {
    pub services: &'a EngineServices,
    pub protocols: &'a dyn ProtocolCatalog,
    pub providers: &'a dyn ProviderDirectory,
    pub agent_name: &'a str,
}

/// What the store should do for one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Persist `user`, then publish it.
    Write {
        user: Box<User>,
        outcome: MutationOutcome,
        notification: StoreNotification,
    },
    /// Remove the persisted user and publish `None`.
    Clear,
    /// Nothing to write.
    Skip(SkipReason),
}

impl Plan {
    fn write(user: User, outcome: MutationOutcome, notification: StoreNotification) -> Self {
        Plan::Write {
            user: Box::new(user),
            outcome,
            notification,
        }
    }

    fn changed(user: User, process_id: &str, command: &StoreCommand) -> Self {
        Plan::write(
            user,
            MutationOutcome::Applied,
            StoreNotification::ProcessChanged {
                process_id: process_id.to_string(),
                command: command.name().to_string(),
            },
        )
    }
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Computes the plan for `command` against the current user.
pub fn plan(current: Option<&User>, command: &StoreCommand, ctx: &MutationContext<'_>) -> Plan {
    let services = ctx.services;
    match (command, current) {
        (StoreCommand::CreateUser { answers }, _) => {
            match build_user(answers, ctx.agent_name, services) {
                Ok(user) => {
                    if let Some(existing) = current {
                        tracing::warn!("Replacing existing user {} with a new one", existing.id);
                    }
                    let notification = StoreNotification::UserCreated {
                        user_id: user.id.clone(),
                    };
                    Plan::write(
                        user.clone(),
                        MutationOutcome::UserCreated(Box::new(user)),
                        notification,
                    )
                }
                Err(why) => Plan::Skip(SkipReason::InvalidOnboarding(why)),
            }
        }

        (StoreCommand::Clear, _) => Plan::Clear,

        (_, None) => Plan::Skip(SkipReason::NoUser),

        (
            StoreCommand::AddMessage {
                process_id,
                sender,
                text,
            },
            Some(user),
        ) => edit_process(user, process_id, command, |p| {
            with_message(p, *sender, text, services)
        }),

        (StoreCommand::SetStatus { process_id, status }, Some(user)) => {
            edit_process(user, process_id, command, |p| {
                with_status(p, *status, services)
            })
        }

        (
            StoreCommand::SetOutcome {
                process_id,
                outcome,
            },
            Some(user),
        ) => edit_process(user, process_id, command, |p| {
            let mut next = p.clone();
            next.fields.outcome = Some(outcome.clone());
            next
        }),

        (
            StoreCommand::UpdateProcess {
                process_id,
                process,
            },
            Some(user),
        ) => edit_process(user, process_id, command, |_| Process {
            id: process_id.clone(),
            ..process.as_ref().clone()
        }),

        (
            StoreCommand::UpdateSummary {
                process_id,
                summary,
            },
            Some(user),
        ) => edit_process(user, process_id, command, |p| Process {
            summary: summary.clone(),
            ..p.clone()
        }),

        (StoreCommand::UpdateFields { process_id, patch }, Some(user)) => {
            edit_process(user, process_id, command, |p| {
                with_fields_patch(p, patch, services)
            })
        }

        (
            StoreCommand::AttachCollaborator {
                process_id,
                collaborator_id,
                display_name,
            },
            Some(user),
        ) => edit_process(user, process_id, command, |p| {
            with_collaborator(p, collaborator_id, display_name, services)
        }),

        (
            StoreCommand::AttachProvider {
                process_id,
                provider_id,
            },
            Some(user),
        ) => {
            let Some(provider) = ctx.providers.provider(provider_id) else {
                return Plan::Skip(SkipReason::ProviderNotFound);
            };
            edit_process(user, process_id, command, |p| {
                with_collaborator(p, &provider.id, &provider.display_name, services)
            })
        }

        (StoreCommand::ToggleAgentCapability { hats }, Some(user)) => {
            let agent = user.agent.with_hats(hats.clone());
            let notification = StoreNotification::AgentChanged {
                hats: agent.hats.clone(),
            };
            let next = User {
                agent,
                ..user.clone()
            };
            Plan::write(next, MutationOutcome::Applied, notification)
        }

        (StoreCommand::CreateProcess { lens, title }, Some(user)) => {
            append_process(user, new_process(*lens, title, services))
        }

        (StoreCommand::AddProcess { process }, Some(user)) => {
            append_process(user, process.as_ref().clone())
        }

        (StoreCommand::CreateProcessFromTemplate { template_id }, Some(user)) => {
            match ctx.protocols.protocol(template_id) {
                Some(protocol) => append_process(user, protocol.seed_process(services)),
                None => Plan::Skip(SkipReason::TemplateNotFound),
            }
        }

        (StoreCommand::Compile { process_id }, Some(user)) => {
            let Some(compiled) = user.process(process_id).map(|p| compile_process(p, services))
            else {
                return Plan::Skip(SkipReason::ProcessNotFound);
            };
            let Some(next) = user.with_process(process_id, |_| compiled.clone()) else {
                return Plan::Skip(SkipReason::ProcessNotFound);
            };
            Plan::write(
                next,
                MutationOutcome::ProcessCompiled(Box::new(compiled)),
                StoreNotification::ProcessChanged {
                    process_id: process_id.clone(),
                    command: command.name().to_string(),
                },
            )
        }
    }
}

fn edit_process<F>(user: &User, process_id: &str, command: &StoreCommand, f: F) -> Plan
where
    F: FnOnce(&Process) -> Process,
{
    match user.with_process(process_id, f) {
        Some(next) => Plan::changed(next, process_id, command),
        None => Plan::Skip(SkipReason::ProcessNotFound),
    }
}

fn append_process(user: &User, process: Process) -> Plan {
    let mut next = user.clone();
    next.processes.push(process.clone());
    let notification = StoreNotification::ProcessAdded {
        process_id: process.id.clone(),
    };
    Plan::write(
        next,
        MutationOutcome::ProcessCreated(Box::new(process)),
        notification,
    )
}

fn with_message(
    process: &Process,
    sender: Sender,
    text: &str,
    services: &EngineServices,
) -> Process {
    let message = services.new_message(sender, text);
    let event = services.new_event(
        ProcessEventType::Note,
        payload(json!({
            "messageId": message.id,
            "text": truncate_chars(text, NOTE_PREVIEW_CHARS),
        })),
    );
    let mut next = process.clone();
    next.messages.push(message);
    next.timeline.push(event);
    next
}

fn with_status(process: &Process, status: ProcessStatus, services: &EngineServices) -> Process {
    let event = services.new_event(
        ProcessEventType::Status,
        payload(json!({ "status": status.as_str() })),
    );
    let mut next = process.clone();
    next.status = status;
    next.timeline.push(event);
    next
}

fn with_fields_patch(
    process: &Process,
    patch: &FieldsPatch,
    services: &EngineServices,
) -> Process {
    let event = services.new_event(
        ProcessEventType::FieldUpdate,
        payload(json!({ "fields": patch.slot_names() })),
    );
    let mut next = process.clone();
    next.fields = patch.apply_to(&process.fields);
    next.timeline.push(event);
    next
}

fn with_collaborator(
    process: &Process,
    collaborator_id: &str,
    display_name: &str,
    services: &EngineServices,
) -> Process {
    let event = services.new_event(
        ProcessEventType::FieldUpdate,
        payload(json!({
            "providerId": collaborator_id,
            "providerDisplayName": display_name,
        })),
    );
    let mut next = process.clone();
    next.fields
        .resources
        .get_or_insert_with(Vec::new)
        .push(format!("{}{}", PROVIDER_RESOURCE_PREFIX, display_name));
    next.timeline.push(event);
    next
}

#[cfg(test)]
#[path = "tests/mutations_tests.rs"]
mod tests;
