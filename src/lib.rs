//! Offline process engine: goal-tracking processes, rule-based compilation of
//! notes into card fields, and a single-writer store persisted to a
//! key-value backend.

pub mod agent_runtime;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod domain;
pub mod engine_paths;
pub mod kv;
pub mod settings;
pub mod store;
pub mod structured_logger;
