//! Append-only message log: record types, the storage trait, and the
//! JSON-snapshot implementation.

pub mod error;
pub mod log;
pub mod record;
pub mod snapshot;

pub use {
    error::{Error, Result},
    log::MessageLog,
    record::{Direction, MessageRecord, now_millis},
    snapshot::SnapshotLog,
};
