//! Structured JSONL logger for debugging and state reconstruction.
//!
//! Every store command and its outcome becomes one line with:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - Session and run IDs for correlation
//! - Structured event data in JSON format

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::EngineError;
use crate::store::{MutationOutcome, StoreCommand};

const LOG_FILE: &str = "events.jsonl";

/// Structured JSONL logger.
pub struct StructuredLogger {
    session_id: String,
    run_id: u64,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number (unique per logger)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    pub session_id: String,
    /// Run ID: one more than the highest run already in the file
    pub run_id: u64,
    /// Component that emitted the log
    pub component: String,
    /// Structured event data
    pub event: Value,
}

impl StructuredLogger {
    /// Opens `<logs_dir>/events.jsonl` for appending.
    ///
    /// The run ID continues from the last entry already in the file, so
    /// successive CLI invocations can be told apart.
    pub fn new(session_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join(LOG_FILE);
        let run_id = last_run_id(&log_path) + 1;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            session_id: session_id.to_string(),
            run_id,
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single line. Thread-safe.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            session_id: self.session_id.clone(),
            run_id: self.run_id,
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    pub fn log_store_command(&self, command: &StoreCommand) {
        self.log(
            "Store",
            serde_json::json!({
                "type": "StoreCommand",
                "command": command
            }),
        );
    }

    pub fn log_store_outcome(
        &self,
        command: &StoreCommand,
        result: &Result<MutationOutcome, EngineError>,
    ) {
        let event = match result {
            Ok(outcome) => serde_json::json!({
                "type": "StoreOutcome",
                "command": command.name(),
                "process_id": command.process_id(),
                "outcome": outcome.label(),
                "skip_reason": outcome.skip_reason(),
            }),
            Err(e) => serde_json::json!({
                "type": "StoreError",
                "command": command.name(),
                "process_id": command.process_id(),
                "error": e.to_string(),
            }),
        };
        self.log("Store", event);
    }

    /// Logs a CLI invocation.
    pub fn log_invocation(&self, command: &str) {
        self.log(
            "Cli",
            serde_json::json!({
                "type": "Invocation",
                "command": command,
                "git_sha": option_env!("ONE01_GIT_SHA").unwrap_or("unknown"),
            }),
        );
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

fn last_run_id(path: &Path) -> u64 {
    let Ok(content) = std::fs::read_to_string(path) else {
        return 0;
    };
    content
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<LogEntry>(line).ok())
        .map(|entry| entry.run_id)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
