use super::*;
use crate::catalog::BuiltinCatalog;
use crate::domain::{Hat, Lens, OnboardingAnswers, OnboardingRejection, Persona};
use proptest::prelude::*;

fn answers() -> OnboardingAnswers {
    OnboardingAnswers {
        name: "Dana".to_string(),
        persona: Some(Persona::Professional),
        lenses: vec![Lens::Knowledge],
        desire: "Learn guitar".to_string(),
    }
}

struct Fixture {
    services: EngineServices,
    catalog: BuiltinCatalog,
}

impl Fixture {
    fn new() -> Self {
        Self {
            services: EngineServices::default(),
            catalog: BuiltinCatalog::new(),
        }
    }

    fn ctx(&self) -> MutationContext<'_> {
        MutationContext {
            services: &self.services,
            protocols: &self.catalog,
            providers: &self.catalog,
            agent_name: "Nobody",
        }
    }

    fn user(&self) -> User {
        match plan(None, &StoreCommand::CreateUser { answers: answers() }, &self.ctx()) {
            Plan::Write { user, .. } => *user,
            other => panic!("expected write, got {:?}", other),
        }
    }

    fn written(&self, user: &User, command: StoreCommand) -> (User, MutationOutcome) {
        match plan(Some(user), &command, &self.ctx()) {
            Plan::Write { user, outcome, .. } => (*user, outcome),
            other => panic!("expected write for {}, got {:?}", command.name(), other),
        }
    }
}

#[test]
fn test_commands_without_user_are_skipped() {
    let fx = Fixture::new();
    let command = StoreCommand::AddMessage {
        process_id: "process_1_abcdefg".to_string(),
        sender: Sender::User,
        text: "hi".to_string(),
    };
    assert_eq!(plan(None, &command, &fx.ctx()), Plan::Skip(SkipReason::NoUser));
    assert_eq!(
        plan(None, &StoreCommand::ToggleAgentCapability { hats: vec![] }, &fx.ctx()),
        Plan::Skip(SkipReason::NoUser)
    );
    assert_eq!(plan(None, &StoreCommand::Clear, &fx.ctx()), Plan::Clear);
}

#[test]
fn test_create_user_and_clear_apply_over_existing_user() {
    let fx = Fixture::new();
    let existing = fx.user();

    let (replaced, outcome) = fx.written(&existing, StoreCommand::CreateUser { answers: answers() });
    assert_ne!(replaced.id, existing.id);
    assert_eq!(outcome, MutationOutcome::UserCreated(Box::new(replaced.clone())));
    assert_eq!(replaced.processes.len(), 1);

    assert_eq!(plan(Some(&existing), &StoreCommand::Clear, &fx.ctx()), Plan::Clear);
}

#[test]
fn test_invalid_onboarding_is_skipped() {
    let fx = Fixture::new();
    let command = StoreCommand::CreateUser {
        answers: OnboardingAnswers {
            persona: None,
            ..answers()
        },
    };
    assert_eq!(
        plan(None, &command, &fx.ctx()),
        Plan::Skip(SkipReason::InvalidOnboarding(
            OnboardingRejection::MissingPersona
        ))
    );
}

#[test]
fn test_unknown_process_is_skipped() {
    let fx = Fixture::new();
    let user = fx.user();
    for command in [
        StoreCommand::SetStatus {
            process_id: "process_0_missing".to_string(),
            status: ProcessStatus::Done,
        },
        StoreCommand::Compile {
            process_id: "process_0_missing".to_string(),
        },
        StoreCommand::UpdateSummary {
            process_id: "process_0_missing".to_string(),
            summary: "x".to_string(),
        },
    ] {
        assert_eq!(
            plan(Some(&user), &command, &fx.ctx()),
            Plan::Skip(SkipReason::ProcessNotFound)
        );
    }
}

#[test]
fn test_add_message_appends_note_event() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();
    let long_text = "a".repeat(150);

    let (next, outcome) = fx.written(
        &user,
        StoreCommand::AddMessage {
            process_id: pid.clone(),
            sender: Sender::User,
            text: long_text.clone(),
        },
    );

    assert_eq!(outcome, MutationOutcome::Applied);
    let process = next.process(&pid).expect("process");
    assert_eq!(process.messages.len(), 1);
    assert_eq!(process.messages[0].text, long_text);
    let event = process.timeline.last().expect("note event");
    assert_eq!(event.event_type, ProcessEventType::Note);
    assert_eq!(event.payload["messageId"], process.messages[0].id.as_str());
    assert_eq!(
        event.payload["text"].as_str().map(|t| t.chars().count()),
        Some(NOTE_PREVIEW_CHARS)
    );
}

#[test]
fn test_status_round_trip_requires_explicit_calls() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();

    let (done, _) = fx.written(
        &user,
        StoreCommand::SetStatus {
            process_id: pid.clone(),
            status: ProcessStatus::Done,
        },
    );
    let (compiled, _) = fx.written(&done, StoreCommand::Compile { process_id: pid.clone() });
    assert!(compiled.process(&pid).map(|p| p.is_done()).unwrap_or(false));

    let (active, _) = fx.written(
        &compiled,
        StoreCommand::SetStatus {
            process_id: pid.clone(),
            status: ProcessStatus::Active,
        },
    );
    let process = active.process(&pid).expect("process");
    assert_eq!(process.status, ProcessStatus::Active);
    assert_eq!(process.timeline.count_of(ProcessEventType::Status), 2);
    assert_eq!(process.timeline.events()[0].payload["status"], "done");
}

#[test]
fn test_outcome_has_no_event() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();
    let (next, _) = fx.written(
        &user,
        StoreCommand::SetOutcome {
            process_id: pid.clone(),
            outcome: "Played first song".to_string(),
        },
    );
    let process = next.process(&pid).expect("process");
    assert_eq!(process.fields.outcome.as_deref(), Some("Played first song"));
    assert!(process.timeline.is_empty());
}

#[test]
fn test_attach_provider_records_resource_and_event() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();

    let (next, _) = fx.written(
        &user,
        StoreCommand::AttachProvider {
            process_id: pid.clone(),
            provider_id: "prov_4".to_string(),
        },
    );
    let process = next.process(&pid).expect("process");
    assert_eq!(
        process.fields.resources,
        Some(vec!["Provider: Sam Knowledge".to_string()])
    );
    let event = process.timeline.last().expect("field update");
    assert_eq!(event.event_type, ProcessEventType::FieldUpdate);
    assert_eq!(event.payload["providerId"], "prov_4");
    assert_eq!(event.payload["providerDisplayName"], "Sam Knowledge");

    assert_eq!(
        plan(
            Some(&user),
            &StoreCommand::AttachProvider {
                process_id: pid,
                provider_id: "prov_404".to_string(),
            },
            &fx.ctx()
        ),
        Plan::Skip(SkipReason::ProviderNotFound)
    );
}

#[test]
fn test_update_fields_lists_slots() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();
    let patch = FieldsPatch {
        risks: Some(vec!["sore fingers".to_string()]),
        ..FieldsPatch::default()
    };

    let (next, _) = fx.written(
        &user,
        StoreCommand::UpdateFields {
            process_id: pid.clone(),
            patch,
        },
    );
    let process = next.process(&pid).expect("process");
    assert_eq!(process.fields.risks, Some(vec!["sore fingers".to_string()]));
    assert_eq!(process.fields.goal.as_deref(), Some("Learn guitar"));
    let event = process.timeline.last().expect("field update");
    assert_eq!(event.payload["fields"], serde_json::json!(["risks"]));
}

#[test]
fn test_update_process_keeps_target_id() {
    let fx = Fixture::new();
    let user = fx.user();
    let pid = user.processes[0].id.clone();
    let mut replacement = new_process(Lens::Health, "Run", &fx.services);
    replacement.summary = "replaced".to_string();

    let (next, _) = fx.written(
        &user,
        StoreCommand::UpdateProcess {
            process_id: pid.clone(),
            process: Box::new(replacement),
        },
    );
    assert_eq!(next.processes.len(), 1);
    let process = next.process(&pid).expect("id preserved");
    assert_eq!(process.title, "Run");
    assert_eq!(process.summary, "replaced");
}

#[test]
fn test_template_creates_seeded_process() {
    let fx = Fixture::new();
    let user = fx.user();

    let (next, outcome) = fx.written(
        &user,
        StoreCommand::CreateProcessFromTemplate {
            template_id: "proto_fin_2".to_string(),
        },
    );
    let created = outcome.process().expect("created process").clone();
    assert_eq!(created.title, "Debt Plan");
    assert_eq!(created.fields.next_steps.as_ref().map(Vec::len), Some(3));
    assert_eq!(next.processes.len(), 2);
    assert_eq!(next.processes[1], created);

    assert_eq!(
        plan(
            Some(&user),
            &StoreCommand::CreateProcessFromTemplate {
                template_id: "proto_nope".to_string()
            },
            &fx.ctx()
        ),
        Plan::Skip(SkipReason::TemplateNotFound)
    );
}

#[test]
fn test_mutation_leaves_other_processes_untouched() {
    let fx = Fixture::new();
    let user = fx.user();
    let (two, _) = fx.written(
        &user,
        StoreCommand::CreateProcess {
            lens: Lens::Knowledge,
            title: "  ".to_string(),
        },
    );
    assert_eq!(two.processes[1].title, "New process");

    let first_id = two.processes[0].id.clone();
    let (next, _) = fx.written(
        &two,
        StoreCommand::UpdateSummary {
            process_id: first_id,
            summary: "changed".to_string(),
        },
    );
    assert_eq!(next.processes[1], two.processes[1]);
    assert_eq!(next.agent, two.agent);
}

fn hat_strategy() -> impl Strategy<Value = Hat> {
    prop::sample::select(Hat::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_toggle_always_keeps_base(
        sequence in prop::collection::vec(prop::collection::vec(hat_strategy(), 0..8), 1..6)
    ) {
        let fx = Fixture::new();
        let mut user = fx.user();
        for hats in sequence {
            let (next, _) = fx.written(&user, StoreCommand::ToggleAgentCapability { hats });
            user = next;
            prop_assert!(user.agent.wears(Hat::Base));
            let mut seen = Vec::new();
            for hat in &user.agent.hats {
                prop_assert!(!seen.contains(hat));
                seen.push(*hat);
            }
        }
    }
}
