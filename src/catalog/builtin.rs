//! Tables shipped with the app: three protocols per lens, ten providers.

use super::{Protocol, ProtocolCatalog, Provider, ProviderDirectory};
use crate::domain::Lens;

type ProtocolRow = (&'static str, &'static str, Lens, u32, &'static str, [&'static str; 3]);

const PROTOCOLS: [ProtocolRow; 12] = [
    (
        "proto_biz_1",
        "Launch Landing Page",
        Lens::Business,
        120,
        "Get a simple landing page live in one session.",
        ["Define goal and audience", "Pick template or structure", "Publish and share link"],
    ),
    (
        "proto_biz_2",
        "Create Logo",
        Lens::Business,
        90,
        "Design a minimal logo for your brand.",
        ["Sketch 3 concepts", "Refine one direction", "Export and save variants"],
    ),
    (
        "proto_biz_3",
        "Build Portfolio",
        Lens::Business,
        180,
        "Assemble a professional portfolio of your work.",
        ["List 5–7 best projects", "Write short case studies", "Choose layout and publish"],
    ),
    (
        "proto_health_1",
        "14-day Start Fitness",
        Lens::Health,
        15,
        "Two-week kickstart with daily micro-workouts.",
        ["Set daily time and place", "Pick 3 exercises", "Log and adjust"],
    ),
    (
        "proto_health_2",
        "Fix Sleep Routine",
        Lens::Health,
        30,
        "Stabilize your sleep schedule in one week.",
        ["Set target bedtime and wake", "Wind-down ritual", "Track for 7 days"],
    ),
    (
        "proto_health_3",
        "Nutrition Basics",
        Lens::Health,
        45,
        "Simple meal and hydration habits.",
        [
            "Define one protein and one veg per day",
            "Plan 3 days of meals",
            "Set water reminders",
        ],
    ),
    (
        "proto_fin_1",
        "Budget Setup",
        Lens::Finance,
        60,
        "One-page budget that fits your pay cycle.",
        ["List income and fixed costs", "Allocate buckets", "Set one saving rule"],
    ),
    (
        "proto_fin_2",
        "Debt Plan",
        Lens::Finance,
        45,
        "Prioritize and track debt payoff.",
        [
            "List all debts and rates",
            "Choose strategy (avalanche/snowball)",
            "Set first milestone",
        ],
    ),
    (
        "proto_fin_3",
        "Savings Sprint",
        Lens::Finance,
        20,
        "30-day no-spend or low-spend challenge.",
        ["Define allowed exceptions", "Daily check-in", "Review and reward"],
    ),
    (
        "proto_know_1",
        "Learn X in 7 days",
        Lens::Knowledge,
        210,
        "Structured 7-day learning sprint for any topic.",
        ["Pick topic and 3 resources", "Daily 30-min blocks", "Summarize and share"],
    ),
    (
        "proto_know_2",
        "Study Plan",
        Lens::Knowledge,
        40,
        "Build a study plan for an exam or certification.",
        ["List chapters or domains", "Assign days and hours", "Add review slots"],
    ),
    (
        "proto_know_3",
        "Skill Sprint",
        Lens::Knowledge,
        90,
        "Practice one skill with deliberate drills.",
        ["Choose one sub-skill", "Find 3 drills", "Schedule 3 sessions"],
    ),
];

type ProviderRow = (
    &'static str,
    &'static str,
    Lens,
    [&'static str; 3],
    &'static str,
    &'static str,
    f32,
    &'static str,
);

const PROVIDERS: [ProviderRow; 10] = [
    (
        "prov_1",
        "Alex Finance",
        Lens::Finance,
        ["Budgeting", "Debt payoff", "Savings"],
        "$$",
        "Within 24h",
        4.8,
        "Certified coach focused on simple budgets and debt plans.",
    ),
    (
        "prov_2",
        "Jordan Health",
        Lens::Health,
        ["Fitness", "Sleep", "Nutrition"],
        "$",
        "Within 12h",
        4.9,
        "Helping you build sustainable health habits.",
    ),
    (
        "prov_3",
        "Casey Business",
        Lens::Business,
        ["Landing pages", "Branding", "Portfolios"],
        "$$$",
        "Within 48h",
        4.7,
        "Design and launch support for solopreneurs.",
    ),
    (
        "prov_4",
        "Sam Knowledge",
        Lens::Knowledge,
        ["Study plans", "Learning sprints", "Skill drills"],
        "$",
        "Within 24h",
        4.6,
        "Structured learning and exam prep.",
    ),
    (
        "prov_5",
        "Riley Multi",
        Lens::Business,
        ["Strategy", "Marketing", "Operations"],
        "$$",
        "Within 24h",
        4.5,
        "Generalist support for small business.",
    ),
    (
        "prov_6",
        "Morgan Fit",
        Lens::Health,
        ["Workouts", "Recovery", "Habit stacking"],
        "$$",
        "Within 12h",
        4.8,
        "Fitness and routine design.",
    ),
    (
        "prov_7",
        "Taylor Money",
        Lens::Finance,
        ["Investing basics", "Tax prep", "Emergency fund"],
        "$$",
        "Within 48h",
        4.4,
        "Practical money management.",
    ),
    (
        "prov_8",
        "Quinn Learn",
        Lens::Knowledge,
        ["Certifications", "Languages", "Technical skills"],
        "$$",
        "Within 24h",
        4.7,
        "Structured learning paths.",
    ),
    (
        "prov_9",
        "Drew Launch",
        Lens::Business,
        ["MVP", "Pricing", "Pitch"],
        "$$$",
        "Within 48h",
        4.6,
        "From idea to first launch.",
    ),
    (
        "prov_10",
        "Sky Wellness",
        Lens::Health,
        ["Mindfulness", "Stress", "Sleep"],
        "$",
        "Within 24h",
        4.9,
        "Mind and body balance.",
    ),
];

/// Catalog backed by the built-in tables.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    protocols: Vec<Protocol>,
    providers: Vec<Provider>,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        let protocols = PROTOCOLS
            .iter()
            .map(|(id, title, lens, minutes, description, steps)| Protocol {
                id: id.to_string(),
                title: title.to_string(),
                lens: *lens,
                estimate_minutes: *minutes,
                description: description.to_string(),
                steps_preview: steps.map(str::to_string),
            })
            .collect();
        let providers = PROVIDERS
            .iter()
            .map(
                |(id, name, lens, specialties, price, response, rating, bio)| Provider {
                    id: id.to_string(),
                    display_name: name.to_string(),
                    lens: *lens,
                    specialties: specialties.iter().map(|s| s.to_string()).collect(),
                    price_range: price.to_string(),
                    response_time: response.to_string(),
                    rating: *rating,
                    bio: bio.to_string(),
                },
            )
            .collect();
        Self {
            protocols,
            providers,
        }
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCatalog for BuiltinCatalog {
    fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }
}

impl ProviderDirectory for BuiltinCatalog {
    fn providers(&self) -> &[Provider] {
        &self.providers
    }
}
