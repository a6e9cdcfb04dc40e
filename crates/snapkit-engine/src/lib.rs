//! snapkit engine - record-or-compare orchestration
//!
//! Provides the entry points a test harness calls: a [`SnapshotSession`]
//! that owns the per-test counters and the snapshot location, decides per
//! call whether to record a new value or compare against the stored one,
//! and prunes stale keys against a run manifest.

pub mod config;
pub mod prune;
pub mod reconcile;
pub mod session;

pub use config::{detect_ci, SnapshotConfig};
pub use prune::{prune_files, PruneReport};
pub use reconcile::{SnapshotOptions, SnapshotRequest};
pub use session::SnapshotSession;
