//! Domain model for the process engine.
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): lenses, personas, hats, statuses, timestamps
//! - **Entities** (`entities.rs`): the user aggregate and everything it owns
//! - **Normalize** (`normalize.rs`): tolerant loading of persisted shapes
//! - **Onboarding** (`onboarding.rs`): validation and first-user synthesis
//! - **Services** (`services.rs`): clock and id generation
//!
//! Entities carry no behavior beyond construction and lookup; every mutation
//! goes through the [`crate::store`] actor.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod normalize;
pub mod onboarding;
pub mod services;
pub mod types;

pub use entities::{
    Agent, FieldsPatch, Process, ProcessEvent, ProcessFields, ProcessMessage, ProcessReality,
    ProcessStep, Timeline, User,
};
pub use errors::{EngineError, OnboardingRejection};
pub use ids::IdPrefix;
pub use onboarding::OnboardingAnswers;
pub use services::{EngineClock, EngineServices};
pub use types::{
    Hat, Lens, Persona, ProcessEventType, ProcessStatus, Sender, TimestampUtc,
};
