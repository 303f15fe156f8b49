//! Protocol templates and provider directory.
//!
//! The engine only needs lookups; [`BuiltinCatalog`] serves the tables that
//! ship with the app, and embedders can swap in their own implementation.

pub mod builtin;

pub use builtin::BuiltinCatalog;

use crate::domain::onboarding::new_process;
use crate::domain::{EngineServices, Lens, Process, ProcessReality, ProcessStep};
use serde::{Deserialize, Serialize};

/// A ready-made process template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub title: String,
    pub lens: Lens,
    pub estimate_minutes: u32,
    pub description: String,
    pub steps_preview: [String; 3],
}

impl Protocol {
    /// A fresh process seeded from this template: description becomes the
    /// context, the preview steps become both the next steps and an open
    /// checklist, and the estimate becomes the expected time.
    pub fn seed_process(&self, services: &EngineServices) -> Process {
        let mut process = new_process(self.lens, &self.title, services);
        process.fields.context = Some(self.description.clone());
        process.fields.next_steps = Some(self.steps_preview.to_vec());
        process.steps = Some(
            self.steps_preview
                .iter()
                .zip(1u32..)
                .map(|(title, order)| ProcessStep {
                    id: format!("s{}", order),
                    title: title.clone(),
                    completed: false,
                    order,
                })
                .collect(),
        );
        process.reality = Some(ProcessReality {
            estimated_time_minutes: Some(f64::from(self.estimate_minutes)),
            ..ProcessReality::default()
        });
        process
    }
}

/// A human collaborator that can be attached to a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub display_name: String,
    pub lens: Lens,
    pub specialties: Vec<String>,
    pub price_range: String,
    pub response_time: String,
    pub rating: f32,
    pub bio: String,
}

pub trait ProtocolCatalog: Send + Sync {
    fn protocols(&self) -> &[Protocol];

    fn protocol(&self, id: &str) -> Option<&Protocol> {
        self.protocols().iter().find(|p| p.id == id)
    }

    fn protocols_for_lens(&self, lens: Lens) -> Vec<&Protocol> {
        self.protocols().iter().filter(|p| p.lens == lens).collect()
    }
}

pub trait ProviderDirectory: Send + Sync {
    fn providers(&self) -> &[Provider];

    fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers().iter().find(|p| p.id == id)
    }

    fn providers_for_lens(&self, lens: Lens) -> Vec<&Provider> {
        self.providers().iter().filter(|p| p.lens == lens).collect()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
