//! Record-or-compare decision for a single snapshot call
//!
//! With no stored expectation the value is recorded (or refused on CI); with
//! one, the comparator decides between match and mismatch. Counter handling
//! and lifecycle logging live in [`SnapshotSession`](crate::SnapshotSession).

#![allow(clippy::result_large_err)]

use crate::config::SnapshotConfig;
use snapkit_core::errors::{ExError, SnapshotError};
use snapkit_core::value::is_empty_text;
use snapkit_core::{CompareOutcome, Comparator, SnapshotId, SnapshotName};
use snapkit_store::{load_snapshots, save_snapshots, Result, SnapshotPaths};
use serde_json::Value;

/// Per-call policy
///
/// `None` fields fall back to the session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub ci: Option<bool>,
    /// Decide as usual but never write the snapshot file
    pub dry_run: bool,
    /// Log every recorded value
    pub show: bool,
    /// Ignore any stored value and record the current one
    pub update: bool,
    pub sort_keys: Option<bool>,
}

/// Identity of one snapshot call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    /// Spec file the call comes from
    pub file: String,
    pub name: SnapshotName,
    /// Snapshot file extension; the session default when `None`
    pub extension: Option<String>,
    pub options: SnapshotOptions,
}

impl SnapshotRequest {
    /// A call keyed by test name and occurrence index
    pub fn auto(file: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self::new(file, SnapshotName::auto(test_name))
    }

    /// A call keyed by a literal snapshot name
    pub fn exact(file: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(file, SnapshotName::exact(key))
    }

    pub fn new(file: impl Into<String>, name: SnapshotName) -> Self {
        Self {
            file: file.into(),
            name,
            extension: None,
            options: SnapshotOptions::default(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_options(mut self, options: SnapshotOptions) -> Self {
        self.options = options;
        self
    }
}

/// How a call was resolved
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reconciled {
    /// No expectation existed; the (transformed) value was recorded
    Recorded(Value),
    /// The stored expectation matched
    Matched(Value),
}

impl Reconciled {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Reconciled::Recorded(_) => "recorded",
            Reconciled::Matched(_) => "matched",
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Reconciled::Recorded(value) | Reconciled::Matched(value) => value,
        }
    }
}

/// Decide and apply the outcome for an already-identified call
///
/// `value` must already be canonical. The whole snapshot file is loaded
/// once and rewritten only when a new value is recorded outside dry runs.
pub(crate) fn reconcile<S, C>(
    paths: &SnapshotPaths,
    config: &SnapshotConfig,
    request: &SnapshotRequest,
    id: &SnapshotId,
    value: Value,
    store: S,
    comparator: &C,
) -> Result<Reconciled>
where
    S: FnOnce(Value) -> Value,
    C: Comparator + ?Sized,
{
    let extension = request
        .extension
        .as_deref()
        .unwrap_or(config.extension.as_str());
    let path = paths.resolve(&request.file, extension)?;
    let mut snapshots = load_snapshots(&path)?;

    let expected = if request.options.update {
        tracing::debug!(key = id.key.as_str(), "update requested, ignoring stored value");
        None
    } else {
        snapshots.get(&id.key).cloned()
    };

    let Some(expected) = expected else {
        if request.options.ci.unwrap_or(config.ci) {
            let cwd = std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default();
            tracing::warn!(
                current_dir = cwd.as_str(),
                value = %value,
                "new value to save"
            );
            return Err(domain_error(SnapshotError::CannotSaveOnCi {
                file: request.file.clone(),
                spec_name: request.name.spec_name().to_string(),
                key: id.key.clone(),
            }));
        }

        let stored = store(value);
        if is_empty_text(&stored) {
            return Err(domain_error(SnapshotError::EmptyValue {
                key: id.key.clone(),
            }));
        }

        if request.options.show || request.options.dry_run {
            tracing::info!(
                key = id.key.as_str(),
                file = paths.relative_display(&path).as_str(),
                value = %stored,
                "saving snapshot"
            );
        }

        snapshots.insert(id.key.clone(), stored.clone());
        if !request.options.dry_run {
            let sort_keys = request.options.sort_keys.unwrap_or(config.sort_keys);
            save_snapshots(&path, &snapshots, sort_keys)?;
            tracing::debug!(key = id.key.as_str(), index = ?id.index, "saved snapshot");
        }
        return Ok(Reconciled::Recorded(stored));
    };

    let spec_name = request.name.spec_name();
    tracing::debug!(spec_name, "found stored snapshot");
    match comparator.compare(&expected, &value) {
        CompareOutcome::Match => Ok(Reconciled::Matched(expected)),
        CompareOutcome::Mismatch { message } => {
            tracing::debug!(spec_name, "snapshot difference");
            Err(domain_error(SnapshotError::SnapshotMismatch {
                spec_name: spec_name.to_string(),
                message,
            }))
        }
    }
}

fn domain_error(err: SnapshotError) -> ExError {
    ExError::from(err).with_op("record_or_compare")
}
