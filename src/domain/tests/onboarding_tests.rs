use super::*;
use crate::domain::ids::has_prefix;

fn valid_answers() -> OnboardingAnswers {
    OnboardingAnswers {
        name: "  Dana ".to_string(),
        persona: Some(Persona::Friendly),
        lenses: vec![Lens::Knowledge, Lens::Health],
        desire: " Learn guitar ".to_string(),
    }
}

#[test]
fn test_build_user_from_valid_answers() {
    let services = EngineServices::default();
    let user = build_user(&valid_answers(), "Nobody", &services).expect("valid answers");

    assert!(has_prefix(&user.id, IdPrefix::User));
    assert!(has_prefix(&user.agent.id, IdPrefix::Agent));
    assert_eq!(user.name, "Dana");
    assert_eq!(user.lenses, vec![Lens::Knowledge, Lens::Health]);
    assert_eq!(user.agent.name, "Nobody");
    assert_eq!(user.agent.hats, vec![Hat::Base]);

    assert_eq!(user.processes.len(), 1);
    let first = &user.processes[0];
    assert!(has_prefix(&first.id, IdPrefix::Process));
    assert_eq!(first.title, "Learn guitar");
    assert_eq!(first.lens, Lens::Knowledge);
    assert_eq!(first.status, ProcessStatus::Active);
    assert_eq!(first.summary, "Goal: Learn guitar");
    assert_eq!(first.fields.goal.as_deref(), Some("Learn guitar"));
    assert!(first.timeline.is_empty());
}

#[test]
fn test_blank_desire_uses_default_goal() {
    let answers = OnboardingAnswers {
        desire: "   ".to_string(),
        ..valid_answers()
    };
    let user = build_user(&answers, "Nobody", &EngineServices::default()).unwrap();
    assert_eq!(user.processes[0].title, DEFAULT_FIRST_GOAL);
}

#[test]
fn test_rejects_empty_name() {
    let answers = OnboardingAnswers {
        name: " ".to_string(),
        ..valid_answers()
    };
    assert_eq!(answers.validate(), Err(OnboardingRejection::EmptyName));
}

#[test]
fn test_rejects_missing_persona() {
    let answers = OnboardingAnswers {
        persona: None,
        ..valid_answers()
    };
    assert_eq!(answers.validate(), Err(OnboardingRejection::MissingPersona));
}

#[test]
fn test_rejects_no_lens() {
    let answers = OnboardingAnswers {
        lenses: Vec::new(),
        ..valid_answers()
    };
    assert_eq!(answers.validate(), Err(OnboardingRejection::NoLens));
}

#[test]
fn test_rejects_four_lenses_but_collapses_duplicates() {
    let four = OnboardingAnswers {
        lenses: Lens::ALL.to_vec(),
        ..valid_answers()
    };
    assert_eq!(four.validate(), Err(OnboardingRejection::TooManyLenses));

    let dupes = OnboardingAnswers {
        lenses: vec![Lens::Health, Lens::Health, Lens::Finance, Lens::Health],
        ..valid_answers()
    };
    let (_, lenses) = dupes.validate().expect("two distinct lenses");
    assert_eq!(lenses, vec![Lens::Health, Lens::Finance]);
}

#[test]
fn test_new_process_blank_title_defaults() {
    let process = new_process(Lens::Business, "  ", &EngineServices::default());
    assert_eq!(process.title, DEFAULT_PROCESS_TITLE);
    assert_eq!(process.summary, "Goal: New process");
}
