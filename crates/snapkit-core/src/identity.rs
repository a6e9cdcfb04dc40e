//! Snapshot identity and per-test counters
//!
//! An auto-named snapshot gets the key `"<test name> <n>"` where `n` counts
//! the calls made for that test in the same file, starting at 1. An exact
//! name is used verbatim and never touches the counters.

use crate::errors::{Result, SnapshotError};
use std::collections::HashMap;

/// How the key of a snapshot is derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotName {
    /// Test name, suffixed with the occurrence index
    Auto(String),
    /// Literal key, used as-is
    Exact(String),
}

impl SnapshotName {
    pub fn auto(test_name: impl Into<String>) -> Self {
        SnapshotName::Auto(test_name.into())
    }

    pub fn exact(key: impl Into<String>) -> Self {
        SnapshotName::Exact(key.into())
    }

    /// Name shown to users when reporting on this snapshot
    pub fn spec_name(&self) -> &str {
        match self {
            SnapshotName::Auto(name) | SnapshotName::Exact(name) => name,
        }
    }
}

/// Resolved identity of one snapshot call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotId {
    pub key: String,
    /// Occurrence index; `None` for exact names
    pub index: Option<u32>,
}

/// Restricts a counter reset to one test of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetScope {
    pub file: String,
    pub spec_name: String,
}

/// Form an auto key
pub fn form_key(spec_name: &str, index: u32) -> String {
    format!("{} {}", spec_name, index)
}

/// Occurrence counters keyed by (file, test name)
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    counts: HashMap<(String, String), u32>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the counter for a test
    ///
    /// The first call for a (file, test name) pair returns 1.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `file` or `test_name` is empty
    pub fn next_index(&mut self, file: &str, test_name: &str) -> Result<u32> {
        validate_identity(file, test_name)?;
        let count = self
            .counts
            .entry((file.to_string(), test_name.to_string()))
            .or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Current count without advancing (0 if never seen)
    pub fn current(&self, file: &str, test_name: &str) -> u32 {
        self.counts
            .get(&(file.to_string(), test_name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_all(&mut self) {
        tracing::debug!("restoring all counters");
        self.counts.clear();
    }

    /// Clear the counter of a single test
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `file` or `test_name` is empty
    pub fn reset_one(&mut self, file: &str, test_name: &str) -> Result<()> {
        validate_identity(file, test_name)?;
        tracing::debug!(file, test_name, "restoring counter");
        self.counts
            .remove(&(file.to_string(), test_name.to_string()));
        Ok(())
    }

    /// Reset everything, or only the given scope
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: the scope has an empty field
    pub fn reset(&mut self, scope: Option<&ResetScope>) -> Result<()> {
        match scope {
            None => {
                self.reset_all();
                Ok(())
            }
            Some(scope) => self.reset_one(&scope.file, &scope.spec_name),
        }
    }

    /// Derive the key for a call, advancing the counter for auto names
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: the file or the name is empty
    pub fn derive(&mut self, file: &str, name: &SnapshotName) -> Result<SnapshotId> {
        match name {
            SnapshotName::Exact(key) => {
                validate_identity(file, key)?;
                Ok(SnapshotId {
                    key: key.clone(),
                    index: None,
                })
            }
            SnapshotName::Auto(test_name) => {
                let index = self.next_index(file, test_name)?;
                tracing::debug!(test_name = test_name.as_str(), index, "snapshot index");
                Ok(SnapshotId {
                    key: form_key(test_name, index),
                    index: Some(index),
                })
            }
        }
    }
}

fn validate_identity(file: &str, name: &str) -> Result<()> {
    if file.is_empty() {
        return Err(SnapshotError::invalid_argument("missing file"));
    }
    if name.is_empty() {
        return Err(SnapshotError::invalid_argument("missing spec name"));
    }
    Ok(())
}
