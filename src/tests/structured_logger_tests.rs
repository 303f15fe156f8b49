use super::*;
use crate::store::SkipReason;
use tempfile::TempDir;

fn create_test_logger() -> (StructuredLogger, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger =
        StructuredLogger::new("test-session", temp_dir.path()).expect("Failed to create logger");
    (logger, temp_dir)
}

fn read_entries(temp_dir: &TempDir) -> Vec<LogEntry> {
    let content = std::fs::read_to_string(temp_dir.path().join("events.jsonl"))
        .expect("Failed to read log file");
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse log entry"))
        .collect()
}

#[test]
fn test_log_entries_are_valid_json() {
    let (logger, temp_dir) = create_test_logger();

    logger.log("TestComponent", serde_json::json!({"key": "value1"}));
    logger.log("TestComponent", serde_json::json!({"key": "value2"}));

    let entries = read_entries(&temp_dir);
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry.session_id, "test-session");
        assert_eq!(entry.component, "TestComponent");
    }
}

#[test]
fn test_sequence_numbers_monotonic() {
    let (logger, temp_dir) = create_test_logger();

    for i in 0..10 {
        logger.log("Test", serde_json::json!({"iteration": i}));
    }

    let mut prev_seq = 0u64;
    for entry in read_entries(&temp_dir) {
        assert!(
            entry.seq > prev_seq,
            "Sequence numbers should be monotonically increasing"
        );
        prev_seq = entry.seq;
    }
}

#[test]
fn test_run_id_continues_across_loggers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let first = StructuredLogger::new("s", temp_dir.path()).expect("first logger");
    assert_eq!(first.run_id(), 1);
    first.log("Test", serde_json::json!({"msg": "first"}));
    drop(first);

    let second = StructuredLogger::new("s", temp_dir.path()).expect("second logger");
    assert_eq!(second.run_id(), 2);
    second.log("Test", serde_json::json!({"msg": "second"}));

    let run_ids: Vec<u64> = read_entries(&temp_dir).iter().map(|e| e.run_id).collect();
    assert_eq!(run_ids, vec![1, 2]);
}

#[test]
fn test_concurrent_logging() {
    use std::sync::Arc;
    use std::thread;

    let (logger, temp_dir) = create_test_logger();
    let logger = Arc::new(logger);

    let mut handles = vec![];
    for t in 0..5 {
        let logger_clone = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                logger_clone.log("Thread", serde_json::json!({"thread": t, "iteration": i}));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(read_entries(&temp_dir).len(), 100);
}

#[test]
fn test_timestamp_format() {
    let (logger, temp_dir) = create_test_logger();
    logger.log("Test", serde_json::json!({"msg": "test"}));

    let entry = read_entries(&temp_dir).remove(0);
    assert!(entry.ts.contains('T'));
    assert!(entry.ts.ends_with('Z'));
    let micros_part = entry.ts.split('.').nth(1).unwrap();
    assert_eq!(micros_part.len(), 7); // 6 digits + 'Z'
}

#[test]
fn test_store_command_and_outcome_logging() {
    let (logger, temp_dir) = create_test_logger();

    let command = StoreCommand::Compile {
        process_id: "process_1_abcdefg".to_string(),
    };
    logger.log_store_command(&command);
    logger.log_store_outcome(
        &command,
        &Ok(MutationOutcome::Skipped(SkipReason::ProcessNotFound)),
    );
    logger.log_store_outcome(&command, &Err(EngineError::EngineStopped));

    let entries = read_entries(&temp_dir);
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].component, "Store");
    assert_eq!(entries[0].event["type"], "StoreCommand");
    assert_eq!(entries[0].event["command"]["command"], "compile");
    assert_eq!(entries[0].event["command"]["process_id"], "process_1_abcdefg");

    assert_eq!(entries[1].event["type"], "StoreOutcome");
    assert_eq!(entries[1].event["outcome"], "skipped");
    assert_eq!(entries[1].event["skip_reason"], "process_not_found");

    assert_eq!(entries[2].event["type"], "StoreError");
    assert_eq!(entries[2].event["error"], "process engine is not running");
}

#[test]
fn test_invocation_logging() {
    let (logger, temp_dir) = create_test_logger();
    logger.log_invocation("status");

    let entry = read_entries(&temp_dir).remove(0);
    assert_eq!(entry.component, "Cli");
    assert_eq!(entry.event["command"], "status");
    assert!(entry.event["git_sha"].is_string());
}
