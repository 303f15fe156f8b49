//! Process store: owner and sole writer of the user aggregate.
//!
//! # Architecture
//!
//! - **Commands** (`commands.rs`): operations, outcomes, notifications
//! - **Mutations** (`mutations.rs`): pure next-state computation
//! - **Actor** (`actor.rs`): persist-then-publish cycle in one mailbox
//! - **Handle** (`handle.rs`): async API used by the CLI and embedders
//!
//! Each command reads the current user, computes the next one, writes it to
//! the key-value store and only then publishes it. A failed write leaves the
//! published snapshot where it was.

pub mod actor;
pub mod commands;
pub mod handle;
pub mod mutations;

pub use commands::{MutationOutcome, SkipReason, StoreCommand, StoreNotification};
pub use handle::{ProcessStore, StoreOptions, DEFAULT_AGENT_NAME, DEFAULT_EVENT_BUFFER};
