//! Commands accepted by the process store and what they produce.

use crate::domain::{
    FieldsPatch, Hat, Lens, OnboardingAnswers, OnboardingRejection, Process, ProcessStatus,
    Sender, User,
};
use serde::{Deserialize, Serialize};

/// One mutation request. Each command is applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum StoreCommand {
    CreateUser {
        answers: OnboardingAnswers,
    },
    AddMessage {
        process_id: String,
        sender: Sender,
        text: String,
    },
    SetStatus {
        process_id: String,
        status: ProcessStatus,
    },
    SetOutcome {
        process_id: String,
        outcome: String,
    },
    UpdateProcess {
        process_id: String,
        process: Box<Process>,
    },
    UpdateSummary {
        process_id: String,
        summary: String,
    },
    UpdateFields {
        process_id: String,
        patch: FieldsPatch,
    },
    AttachCollaborator {
        process_id: String,
        collaborator_id: String,
        display_name: String,
    },
    AttachProvider {
        process_id: String,
        provider_id: String,
    },
    ToggleAgentCapability {
        hats: Vec<Hat>,
    },
    CreateProcess {
        lens: Lens,
        title: String,
    },
    AddProcess {
        process: Box<Process>,
    },
    CreateProcessFromTemplate {
        template_id: String,
    },
    Compile {
        process_id: String,
    },
    Clear,
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::CreateUser { .. } => "create_user",
            StoreCommand::AddMessage { .. } => "add_message",
            StoreCommand::SetStatus { .. } => "set_status",
            StoreCommand::SetOutcome { .. } => "set_outcome",
            StoreCommand::UpdateProcess { .. } => "update_process",
            StoreCommand::UpdateSummary { .. } => "update_summary",
            StoreCommand::UpdateFields { .. } => "update_fields",
            StoreCommand::AttachCollaborator { .. } => "attach_collaborator",
            StoreCommand::AttachProvider { .. } => "attach_provider",
            StoreCommand::ToggleAgentCapability { .. } => "toggle_agent_capability",
            StoreCommand::CreateProcess { .. } => "create_process",
            StoreCommand::AddProcess { .. } => "add_process",
            StoreCommand::CreateProcessFromTemplate { .. } => "create_process_from_template",
            StoreCommand::Compile { .. } => "compile",
            StoreCommand::Clear => "clear",
        }
    }

    /// The process the command targets, if any.
    pub fn process_id(&self) -> Option<&str> {
        match self {
            StoreCommand::AddMessage { process_id, .. }
            | StoreCommand::SetStatus { process_id, .. }
            | StoreCommand::SetOutcome { process_id, .. }
            | StoreCommand::UpdateProcess { process_id, .. }
            | StoreCommand::UpdateSummary { process_id, .. }
            | StoreCommand::UpdateFields { process_id, .. }
            | StoreCommand::AttachCollaborator { process_id, .. }
            | StoreCommand::AttachProvider { process_id, .. }
            | StoreCommand::Compile { process_id } => Some(process_id),
            _ => None,
        }
    }
}

/// Why a command was accepted without changing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoUser,
    ProcessNotFound,
    TemplateNotFound,
    ProviderNotFound,
    InvalidOnboarding(OnboardingRejection),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoUser => write!(f, "no user yet"),
            SkipReason::ProcessNotFound => write!(f, "process not found"),
            SkipReason::TemplateNotFound => write!(f, "protocol template not found"),
            SkipReason::ProviderNotFound => write!(f, "provider not found"),
            SkipReason::InvalidOnboarding(why) => write!(f, "onboarding rejected: {}", why),
        }
    }
}

/// Result of a successfully processed command.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied,
    UserCreated(Box<User>),
    ProcessCreated(Box<Process>),
    ProcessCompiled(Box<Process>),
    Cleared,
    Skipped(SkipReason),
}

impl MutationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            MutationOutcome::Applied => "applied",
            MutationOutcome::UserCreated(_) => "user_created",
            MutationOutcome::ProcessCreated(_) => "process_created",
            MutationOutcome::ProcessCompiled(_) => "process_compiled",
            MutationOutcome::Cleared => "cleared",
            MutationOutcome::Skipped(_) => "skipped",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MutationOutcome::Skipped(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            MutationOutcome::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    /// The process created or compiled by the command.
    pub fn process(&self) -> Option<&Process> {
        match self {
            MutationOutcome::ProcessCreated(p) | MutationOutcome::ProcessCompiled(p) => Some(p),
            _ => None,
        }
    }
}

/// Broadcast after every persisted mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreNotification {
    UserCreated { user_id: String },
    UserCleared,
    ProcessAdded { process_id: String },
    ProcessChanged { process_id: String, command: String },
    AgentChanged { hats: Vec<Hat> },
}
