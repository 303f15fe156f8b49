//! Store actor: the single writer of the user aggregate.
//!
//! Every operation is a message in one mailbox, so each read-modify-write
//! starts from the previous one's result even when callers fire several
//! operations without awaiting them.

use crate::catalog::{ProtocolCatalog, ProviderDirectory};
use crate::domain::normalize::parse_stored_user;
use crate::domain::{EngineError, EngineServices, User};
use crate::kv::{KeyValueStore, USER_KEY};
use crate::store::commands::{MutationOutcome, StoreCommand, StoreNotification};
use crate::store::mutations::{plan, MutationContext, Plan};
use crate::structured_logger::StructuredLogger;
use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, watch};

/// Messages that can be sent to the store actor.
pub enum StoreMessage {
    /// Apply a command and reply with its outcome.
    Command(
        Box<StoreCommand>,
        oneshot::Sender<Result<MutationOutcome, EngineError>>,
    ),
    /// Reply with the current user.
    GetUser(oneshot::Sender<Option<User>>),
}

/// Arguments for spawning the store actor.
#[derive(Clone)]
pub struct StoreActorArgs {
    pub kv: Arc<dyn KeyValueStore>,
    pub protocols: Arc<dyn ProtocolCatalog>,
    pub providers: Arc<dyn ProviderDirectory>,
    pub services: EngineServices,
    /// Name given to the agent of a newly onboarded user.
    pub agent_name: String,
    /// Watch channel sender for user snapshots.
    pub snapshot_tx: watch::Sender<Option<User>>,
    /// Broadcast channel sender for mutation notifications.
    pub event_tx: broadcast::Sender<StoreNotification>,
    pub logger: Option<Arc<StructuredLogger>>,
}

pub struct StoreActorState {
    args: StoreActorArgs,
    user: Option<User>,
}

pub struct StoreActor;

/// Reads and normalizes the persisted user. Any failure means "no user".
pub async fn load_user(kv: &dyn KeyValueStore) -> Option<User> {
    match kv.get(USER_KEY).await {
        Ok(Some(raw)) => parse_stored_user(&raw),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to read stored user: {:#}", e);
            None
        }
    }
}

impl StoreActorState {
    async fn apply(&mut self, command: &StoreCommand) -> Result<MutationOutcome, EngineError> {
        let ctx = MutationContext {
            services: &self.args.services,
            protocols: self.args.protocols.as_ref(),
            providers: self.args.providers.as_ref(),
            agent_name: &self.args.agent_name,
        };

        match plan(self.user.as_ref(), command, &ctx) {
            Plan::Skip(reason) => {
                tracing::debug!("Skipped {}: {}", command.name(), reason);
                Ok(MutationOutcome::Skipped(reason))
            }
            Plan::Clear => {
                self.args
                    .kv
                    .remove(USER_KEY)
                    .await
                    .map_err(persistence_error)?;
                self.user = None;
                self.publish(StoreNotification::UserCleared);
                Ok(MutationOutcome::Cleared)
            }
            Plan::Write {
                user,
                outcome,
                notification,
            } => {
                let serialized = serde_json::to_string(&user).map_err(|e| {
                    EngineError::PersistenceUnavailable {
                        message: format!("failed to serialize user: {}", e),
                    }
                })?;
                self.args
                    .kv
                    .set(USER_KEY, &serialized)
                    .await
                    .map_err(persistence_error)?;
                self.user = Some(*user);
                self.publish(notification);
                Ok(outcome)
            }
        }
    }

    fn publish(&self, notification: StoreNotification) {
        self.args.snapshot_tx.send_replace(self.user.clone());
        if self.args.event_tx.send(notification).is_err() {
            tracing::debug!("No subscribers for store notification");
        }
    }

    fn log_command(&self, command: &StoreCommand) {
        if let Some(logger) = &self.args.logger {
            logger.log_store_command(command);
        }
    }

    fn log_outcome(&self, command: &StoreCommand, result: &Result<MutationOutcome, EngineError>) {
        if let Some(logger) = &self.args.logger {
            logger.log_store_outcome(command, result);
        }
    }
}

fn persistence_error(e: anyhow::Error) -> EngineError {
    tracing::warn!("Persisting user failed: {:#}", e);
    EngineError::PersistenceUnavailable {
        message: format!("{:#}", e),
    }
}

#[async_trait]
impl Actor for StoreActor {
    type Msg = StoreMessage;
    type State = StoreActorState;
    type Arguments = StoreActorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let user = load_user(args.kv.as_ref()).await;
        match &user {
            Some(u) => tracing::debug!("Loaded user {} with {} processes", u.id, u.processes.len()),
            None => tracing::debug!("No stored user; onboarding required"),
        }
        args.snapshot_tx.send_replace(user.clone());
        Ok(StoreActorState { args, user })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            StoreMessage::Command(boxed_cmd, reply) => {
                let cmd = *boxed_cmd;
                state.log_command(&cmd);
                let result = state.apply(&cmd).await;
                state.log_outcome(&cmd, &result);

                if reply.send(result).is_err() {
                    tracing::debug!("Command reply channel closed");
                }
            }
            StoreMessage::GetUser(reply) => {
                if reply.send(state.user.clone()).is_err() {
                    tracing::debug!("Command reply channel closed");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/actor_tests.rs"]
mod tests;
