//! Onboarding answers and construction of the initial user aggregate.

use crate::domain::entities::{Agent, Process, ProcessFields, User};
use crate::domain::errors::OnboardingRejection;
use crate::domain::ids::IdPrefix;
use crate::domain::services::EngineServices;
use crate::domain::types::{Hat, Lens, Persona, ProcessStatus};
use crate::domain::Timeline;
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Maximum lenses a user can pick.
pub const MAX_LENSES: usize = 3;
/// Title of the first process when the user left the desire blank.
pub const DEFAULT_FIRST_GOAL: &str = "My first goal";
/// Title of a directly created process with a blank title.
pub const DEFAULT_PROCESS_TITLE: &str = "New process";

/// What the onboarding flow collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub name: String,
    pub persona: Option<Persona>,
    pub lenses: Vec<Lens>,
    pub desire: String,
}

impl OnboardingAnswers {
    /// Lenses with duplicates collapsed, in selection order.
    pub fn distinct_lenses(&self) -> Vec<Lens> {
        let mut out = Vec::new();
        for lens in &self.lenses {
            if !out.contains(lens) {
                out.push(*lens);
            }
        }
        out
    }

    pub fn validate(&self) -> Result<(Persona, Vec<Lens>), OnboardingRejection> {
        if self.name.trim().is_empty() {
            return Err(OnboardingRejection::EmptyName);
        }
        let persona = self.persona.ok_or(OnboardingRejection::MissingPersona)?;
        let lenses = self.distinct_lenses();
        if lenses.is_empty() {
            return Err(OnboardingRejection::NoLens);
        }
        if lenses.len() > MAX_LENSES {
            return Err(OnboardingRejection::TooManyLenses);
        }
        Ok((persona, lenses))
    }
}

/// Synthesizes the user, agent and first process from valid answers.
pub fn build_user(
    answers: &OnboardingAnswers,
    agent_name: &str,
    services: &EngineServices,
) -> Result<User, OnboardingRejection> {
    let (persona, lenses) = answers.validate()?;

    let desire = match answers.desire.trim() {
        "" => DEFAULT_FIRST_GOAL,
        d => d,
    };
    let agent = Agent {
        id: services.new_id(IdPrefix::Agent),
        name: agent_name.to_string(),
        persona,
        hats: vec![Hat::Base],
        extra: Map::new(),
    };
    let first_process = new_process(lenses[0], desire, services);

    Ok(User {
        id: services.new_id(IdPrefix::User),
        name: answers.name.trim().to_string(),
        lenses,
        agent,
        processes: vec![first_process],
        extra: Map::new(),
    })
}

/// A fresh active process whose goal is its title.
pub fn new_process(lens: Lens, title: &str, services: &EngineServices) -> Process {
    let title = match title.trim() {
        "" => DEFAULT_PROCESS_TITLE,
        t => t,
    };
    Process {
        id: services.new_id(IdPrefix::Process),
        title: title.to_string(),
        lens,
        status: ProcessStatus::Active,
        created_at: services.clock.now(),
        summary: format!("Goal: {}", title),
        messages: Vec::new(),
        fields: ProcessFields {
            goal: Some(title.to_string()),
            ..ProcessFields::default()
        },
        timeline: Timeline::default(),
        steps: None,
        reality: None,
        extra: Map::new(),
    }
}

#[cfg(test)]
#[path = "tests/onboarding_tests.rs"]
mod tests;
