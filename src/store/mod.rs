//! Local persistence for hooks
//!
//! Append-only JSON Lines logs and whole-document JSON snapshots

mod error;
mod journal;
mod snapshot;

pub use error::{StoreError, StoreResult};
pub use journal::JsonLinesLog;
pub use snapshot::SnapshotStore;
