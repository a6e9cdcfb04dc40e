//! snapkit core - snapshot values, file format and decision building blocks
//!
//! This crate provides the pure, I/O-free parts of snapshot testing:
//! - Canonical values (`value`) and the snapshot file format (`format`)
//! - Deterministic snapshot identity and per-test counters (`identity`)
//! - Comparators with tagged outcomes (`compare`)
//! - Pruning of stale keys against a run manifest (`prune`)
//! - The error and logging facilities shared by the other crates

pub mod compare;
pub mod errors;
pub mod format;
pub mod identity;
pub mod logging_facility;
pub mod prune;
pub mod value;

pub use snapkit_core_types::schema;

// Re-export commonly used types
pub use compare::{CompareOutcome, Comparator, JsonComparator, TextDiffComparator};
pub use errors::{ExError, ExErrorKind, Result, SnapshotError};
pub use identity::{form_key, CounterTable, ResetScope, SnapshotId, SnapshotName};
pub use prune::{prune_in_object, RuntimeSnapshot};
pub use value::{strip, Snapshots};
