//! Engine handle owned by the composition root.
//!
//! `ProcessStore::initialize` spawns the store actor, which loads the
//! persisted user before accepting commands. Every operation sends one
//! command and waits for its outcome; reads come from the last published
//! snapshot.

use crate::catalog::{BuiltinCatalog, ProtocolCatalog, ProviderDirectory};
use crate::domain::{
    EngineError, EngineServices, FieldsPatch, Hat, Lens, OnboardingAnswers, Process,
    ProcessStatus, Sender, User,
};
use crate::kv::KeyValueStore;
use crate::store::actor::{StoreActor, StoreActorArgs, StoreMessage};
use crate::store::commands::{MutationOutcome, StoreCommand, StoreNotification};
use crate::structured_logger::StructuredLogger;
use anyhow::{Context, Result};
use ractor::{Actor, ActorRef};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

/// Default broadcast capacity for store notifications.
pub const DEFAULT_EVENT_BUFFER: usize = 64;
/// Default name of a new user's agent.
pub const DEFAULT_AGENT_NAME: &str = "Nobody";

/// Everything the engine needs at startup.
#[derive(Clone)]
pub struct StoreOptions {
    pub kv: Arc<dyn KeyValueStore>,
    pub protocols: Arc<dyn ProtocolCatalog>,
    pub providers: Arc<dyn ProviderDirectory>,
    pub services: EngineServices,
    pub agent_name: String,
    pub event_buffer: usize,
    pub logger: Option<Arc<StructuredLogger>>,
}

impl StoreOptions {
    /// Options with the built-in catalog and default settings.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let catalog = Arc::new(BuiltinCatalog::new());
        Self {
            kv,
            protocols: catalog.clone(),
            providers: catalog,
            services: EngineServices::default(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            logger: None,
        }
    }

    pub fn with_services(mut self, services: EngineServices) -> Self {
        self.services = services;
        self
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    pub fn with_event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer;
        self
    }

    pub fn with_logger(mut self, logger: Arc<StructuredLogger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// Handle to a running process engine.
pub struct ProcessStore {
    actor: ActorRef<StoreMessage>,
    join: JoinHandle<()>,
    snapshot_rx: watch::Receiver<Option<User>>,
    event_tx: broadcast::Sender<StoreNotification>,
    providers: Arc<dyn ProviderDirectory>,
    protocols: Arc<dyn ProtocolCatalog>,
}

impl ProcessStore {
    /// Spawns the store actor and waits until the persisted user is loaded.
    pub async fn initialize(options: StoreOptions) -> Result<Self> {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(options.event_buffer.max(1));

        let args = StoreActorArgs {
            kv: options.kv,
            protocols: options.protocols.clone(),
            providers: options.providers.clone(),
            services: options.services,
            agent_name: options.agent_name,
            snapshot_tx,
            event_tx: event_tx.clone(),
            logger: options.logger,
        };

        let (actor, join) = StoreActor::spawn(None, StoreActor, args)
            .await
            .context("Failed to start process store")?;

        Ok(Self {
            actor,
            join,
            snapshot_rx,
            event_tx,
            providers: options.providers,
            protocols: options.protocols,
        })
    }

    /// Stops the actor. Callers still waiting on a command get `EngineStopped`.
    pub async fn dispose(self) -> Result<()> {
        self.actor.stop(None);
        self.join.await.context("Process store task failed")
    }

    async fn execute(&self, command: StoreCommand) -> Result<MutationOutcome, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.actor
            .send_message(StoreMessage::Command(Box::new(command), tx))
            .map_err(|_| EngineError::EngineStopped)?;
        rx.await.map_err(|_| EngineError::EngineStopped)?
    }

    /// Last published user, if onboarding has completed.
    pub fn current_user(&self) -> Option<User> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn get_process(&self, process_id: &str) -> Option<Process> {
        self.snapshot_rx
            .borrow()
            .as_ref()
            .and_then(|u| u.process(process_id).cloned())
    }

    /// The user as the actor currently holds it, after queued commands.
    pub async fn fetch_user(&self) -> Result<Option<User>, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.actor
            .send_message(StoreMessage::GetUser(tx))
            .map_err(|_| EngineError::EngineStopped)?;
        rx.await.map_err(|_| EngineError::EngineStopped)
    }

    /// Receiver of every published user snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.snapshot_rx.clone()
    }

    /// Receiver of mutation notifications published from now on.
    pub fn events(&self) -> broadcast::Receiver<StoreNotification> {
        self.event_tx.subscribe()
    }

    pub fn protocols(&self) -> &dyn ProtocolCatalog {
        self.protocols.as_ref()
    }

    pub fn providers(&self) -> &dyn ProviderDirectory {
        self.providers.as_ref()
    }

    pub async fn create_user(
        &self,
        answers: OnboardingAnswers,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::CreateUser { answers }).await
    }

    pub async fn add_message(
        &self,
        process_id: &str,
        sender: Sender,
        text: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::AddMessage {
            process_id: process_id.to_string(),
            sender,
            text: text.to_string(),
        })
        .await
    }

    pub async fn set_status(
        &self,
        process_id: &str,
        status: ProcessStatus,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::SetStatus {
            process_id: process_id.to_string(),
            status,
        })
        .await
    }

    pub async fn set_outcome(
        &self,
        process_id: &str,
        outcome: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::SetOutcome {
            process_id: process_id.to_string(),
            outcome: outcome.to_string(),
        })
        .await
    }

    pub async fn update_process(
        &self,
        process_id: &str,
        process: Process,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::UpdateProcess {
            process_id: process_id.to_string(),
            process: Box::new(process),
        })
        .await
    }

    pub async fn update_summary(
        &self,
        process_id: &str,
        summary: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::UpdateSummary {
            process_id: process_id.to_string(),
            summary: summary.to_string(),
        })
        .await
    }

    pub async fn update_fields(
        &self,
        process_id: &str,
        patch: FieldsPatch,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::UpdateFields {
            process_id: process_id.to_string(),
            patch,
        })
        .await
    }

    pub async fn attach_collaborator(
        &self,
        process_id: &str,
        collaborator_id: &str,
        display_name: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::AttachCollaborator {
            process_id: process_id.to_string(),
            collaborator_id: collaborator_id.to_string(),
            display_name: display_name.to_string(),
        })
        .await
    }

    /// Attaches a provider from the directory by id.
    pub async fn attach_provider(
        &self,
        process_id: &str,
        provider_id: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::AttachProvider {
            process_id: process_id.to_string(),
            provider_id: provider_id.to_string(),
        })
        .await
    }

    pub async fn toggle_agent_capability(
        &self,
        hats: Vec<Hat>,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::ToggleAgentCapability { hats })
            .await
    }

    pub async fn create_process(
        &self,
        lens: Lens,
        title: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::CreateProcess {
            lens,
            title: title.to_string(),
        })
        .await
    }

    pub async fn add_process(&self, process: Process) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::AddProcess {
            process: Box::new(process),
        })
        .await
    }

    pub async fn create_process_from_template(
        &self,
        template_id: &str,
    ) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::CreateProcessFromTemplate {
            template_id: template_id.to_string(),
        })
        .await
    }

    /// Compiles the process inside the store cycle and persists the result.
    pub async fn compile(&self, process_id: &str) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::Compile {
            process_id: process_id.to_string(),
        })
        .await
    }

    pub async fn clear(&self) -> Result<MutationOutcome, EngineError> {
        self.execute(StoreCommand::Clear).await
    }
}

#[cfg(test)]
#[path = "tests/handle_tests.rs"]
mod tests;
