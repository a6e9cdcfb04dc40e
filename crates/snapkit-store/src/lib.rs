//! snapkit store - snapshot files on disk
//!
//! Provides:
//! - Resolution of snapshot file paths anchored at the original working directory
//! - Whole-file loading through the snapshot format decoder
//! - Whole-file saving with temp→rename writes

pub mod atomic;
pub mod errors;
pub mod fs_store;
pub mod paths;

// Re-export key types
pub use errors::Result;
pub use fs_store::{load_snapshots, load_snapshots_strict, save_snapshots, sort_and_save};
pub use paths::SnapshotPaths;
