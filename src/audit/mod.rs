//! Audit logging for walletbook
//!
//! Every create, update and delete of a card, bank account, goal or the
//! settings is appended to `audit.log` as one JSON line holding before/after
//! snapshots and a short summary of what changed.
//!
//! - `AuditEntry`: one log record
//! - `AuditLogger`: appends and reads the JSONL file
//! - `generate_diff`: summarizes the difference between two snapshots

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
