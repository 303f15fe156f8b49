use super::*;
use crate::domain::onboarding::new_process;
use crate::domain::{Lens, ProcessStatus, Sender, TimestampUtc};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn fixed_services() -> EngineServices {
    let at = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    EngineServices::with_fixed_clock(TimestampUtc(at))
}

fn with_notes(mut process: Process, notes: &[&str], services: &EngineServices) -> Process {
    for note in notes {
        process.messages.push(services.new_message(Sender::User, note));
    }
    process
}

#[test]
fn test_learn_guitar_scenario() {
    let services = fixed_services();
    let process = new_process(Lens::Knowledge, "Learn guitar", &services);
    let process = with_notes(process, &["next: buy a guitar\nbudget: $300"], &services);

    let compiled = compile_process(&process, &services);

    assert_eq!(
        compiled.fields.next_steps,
        Some(vec!["buy a guitar".to_string()])
    );
    let constraints = compiled.fields.constraints.clone().unwrap_or_default();
    assert!(constraints.iter().any(|c| c.contains("$300")));
    assert_eq!(compiled.summary, "Knowledge • active • buy a guitar");
    assert_eq!(compiled.timeline.count_of(ProcessEventType::Compile), 1);
}

#[test]
fn test_accumulates_across_compiles() {
    let services = fixed_services();
    let process = new_process(Lens::Knowledge, "Learn guitar", &services);
    let process = with_notes(process, &["next: buy a guitar"], &services);
    let first = compile_process(&process, &services);

    let second_input = with_notes(first.clone(), &["had a nice walk today"], &services);
    let second = compile_process(&second_input, &services);

    assert_eq!(second.fields.next_steps, Some(vec!["buy a guitar".to_string()]));
    assert_eq!(second.timeline.count_of(ProcessEventType::Compile), 2);
}

#[test]
fn test_summary_falls_back_to_goal_then_title() {
    let services = fixed_services();
    let mut process = new_process(Lens::Health, "Training", &services);
    process.fields.goal = Some("Run 5k".to_string());
    let compiled = compile_process(&process, &services);
    assert!(compiled.summary.contains("Run 5k"));
    assert_eq!(compiled.summary, "Health • active • Run 5k");

    process.fields.goal = None;
    let compiled = compile_process(&process, &services);
    assert_eq!(compiled.summary, "Health • active • Training");
}

#[test]
fn test_compile_preserves_identity_and_messages() {
    let services = fixed_services();
    let mut process = new_process(Lens::Finance, "Save", &services);
    process.status = ProcessStatus::Done;
    process.fields.outcome = Some("Saved".to_string());
    process.fields.resources = Some(vec!["Provider: Dana".to_string()]);
    process.messages.push(services.new_message(Sender::Agent, "next: agent idea"));
    let process = with_notes(process, &["Weather risk. keep going"], &services);

    let compiled = compile_process(&process, &services);

    assert_eq!(compiled.id, process.id);
    assert_eq!(compiled.title, process.title);
    assert_eq!(compiled.lens, process.lens);
    assert_eq!(compiled.created_at, process.created_at);
    assert_eq!(compiled.status, ProcessStatus::Done);
    assert_eq!(compiled.messages, process.messages);
    assert_eq!(compiled.fields.outcome.as_deref(), Some("Saved"));
    assert_eq!(compiled.fields.goal.as_deref(), Some("Save"));
    assert_eq!(
        compiled.fields.resources,
        Some(vec!["Provider: Dana".to_string()])
    );
    assert_eq!(compiled.fields.next_steps, None);
    assert_eq!(compiled.fields.risks, Some(vec!["Weather risk".to_string()]));
    assert_eq!(compiled.summary, "Finance • done • Save");
}

#[test]
fn test_window_only_reads_last_ten_notes() {
    let services = fixed_services();
    let process = new_process(Lens::Business, "Launch", &services);
    let notes: Vec<String> = (0..12).map(|i| format!("- task {}", i)).collect();
    let note_refs: Vec<&str> = notes.iter().map(String::as_str).collect();
    let process = with_notes(process, &note_refs, &services);

    let compiled = compile_process(&process, &services);
    let steps = compiled.fields.next_steps.unwrap_or_default();

    assert_eq!(steps.first().map(String::as_str), Some("task 2"));
    assert_eq!(steps.len(), COMPILE_WINDOW);
}

#[test]
fn test_compile_event_payload_truncates_summary() {
    let services = fixed_services();
    let title = "t".repeat(200);
    let process = new_process(Lens::Health, &title, &services);
    let compiled = compile_process(&process, &services);

    let event = compiled.timeline.last().expect("compile event");
    assert_eq!(event.event_type, ProcessEventType::Compile);
    let payload = event.payload["summary"].as_str().unwrap_or_default();
    assert_eq!(payload.chars().count(), SUMMARY_PAYLOAD_CHARS);
}

#[test]
fn test_empty_process_compiles() {
    let services = fixed_services();
    let process = new_process(Lens::Health, "Sleep", &services);
    let compiled = compile_process(&process, &services);
    assert_eq!(compiled.fields.context, None);
    assert_eq!(compiled.summary, "Health • active • Sleep");
}

fn note_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,30}",
        "[a-z ]{1,20}".prop_map(|s| format!("next: {}", s)),
        "[a-z ]{1,20}".prop_map(|s| format!("- {}", s)),
        "[0-9]{1,4}".prop_map(|n| format!("costs ${} over {} days", n, n)),
        "[a-z ]{0,20}".prop_map(|s| format!("{} risk here. more", s)),
    ]
}

proptest! {
    #[test]
    fn test_recompile_is_idempotent(notes in prop::collection::vec(note_strategy(), 0..15)) {
        let services = fixed_services();
        let process = new_process(Lens::Knowledge, "Learn", &services);
        let refs: Vec<&str> = notes.iter().map(String::as_str).collect();
        let process = with_notes(process, &refs, &services);

        let once = compile_process(&process, &services);
        let twice = compile_process(&once, &services);

        prop_assert_eq!(&once.fields, &twice.fields);
        prop_assert_eq!(&once.summary, &twice.summary);
        prop_assert_eq!(twice.timeline.len(), once.timeline.len() + 1);
    }

    #[test]
    fn test_next_steps_never_regress(
        first in "[a-z]{1,12}",
        filler in prop::collection::vec("[a-m ]{0,30}", 1..12),
    ) {
        let services = fixed_services();
        let process = new_process(Lens::Knowledge, "Learn", &services);
        let first_note = format!("next: {}", first);
        let process = with_notes(process, &[first_note.as_str()], &services);
        let compiled = compile_process(&process, &services);
        let before = compiled.fields.next_steps.clone();
        prop_assert!(before.is_some());

        let refs: Vec<&str> = filler.iter().map(String::as_str).collect();
        let again = compile_process(&with_notes(compiled, &refs, &services), &services);
        // Filler has no markers or bullets, so the list never changes.
        prop_assert_eq!(again.fields.next_steps, before);
    }
}
