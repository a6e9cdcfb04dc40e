//! Core types shared across snapkit facilities
//!
//! This crate provides foundational constants used by both the error
//! handling and logging facilities:
//!
//! - **Schema constants**: Canonical field keys and event names
//! - **Layout constants**: Default snapshot folder and file extension

pub mod schema;

/// Folder (relative to the original working directory) holding snapshot files
pub const DEFAULT_SNAPSHOT_FOLDER: &str = "__snapshots__";

/// Extension appended to the spec file name to form the snapshot file name
pub const DEFAULT_EXTENSION: &str = ".snapshot.js";
