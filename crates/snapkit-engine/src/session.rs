//! Snapshot session with boundary logging.
//!
//! A session owns everything that outlives a single snapshot call:
//! - the occurrence counters of auto-named snapshots
//! - the snapshot folder, anchored at the directory the session started in
//! - the configuration defaults
//!
//! ## Logging Ownership
//!
//! The session owns lifecycle logging for its operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

#![allow(clippy::result_large_err)]

use crate::config::SnapshotConfig;
use crate::prune::{prune_files, PruneReport};
use crate::reconcile::{reconcile, Reconciled, SnapshotRequest};
use serde::Serialize;
use serde_json::Value;
use snapkit_core::errors::ExError;
use snapkit_core::{
    log_op_end, log_op_error, log_op_start, strip, Comparator, CounterTable, JsonComparator,
    ResetScope, RuntimeSnapshot,
};
use snapkit_store::{Result, SnapshotPaths};
use std::future::IntoFuture;
use std::path::{Path, PathBuf};

/// Record-or-compare entry point for a test run
#[derive(Debug)]
pub struct SnapshotSession {
    config: SnapshotConfig,
    paths: SnapshotPaths,
    counters: CounterTable,
}

impl SnapshotSession {
    /// Session rooted at the current directory, configured from the environment
    ///
    /// # Errors
    ///
    /// - `Io`: the current directory cannot be read
    pub fn new() -> Result<Self> {
        let paths = SnapshotPaths::from_current_dir()?;
        Ok(Self::with_root(paths.root(), SnapshotConfig::from_env()))
    }

    /// Session rooted at an explicit directory
    pub fn with_root(root: impl AsRef<Path>, config: SnapshotConfig) -> Self {
        let paths = SnapshotPaths::new(root.as_ref())
            .with_folder(config.folder.clone())
            .with_mirror_relative(config.mirror_relative_paths);
        tracing::debug!(root = %paths.root().display(), "snapshot session created");
        Self {
            config,
            paths,
            counters: CounterTable::new(),
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    /// Snapshot file used for a spec file
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: empty spec file or malformed extension
    pub fn snapshot_path(&self, spec_file: &str, extension: Option<&str>) -> Result<PathBuf> {
        self.paths
            .resolve(spec_file, extension.unwrap_or(self.config.extension.as_str()))
    }

    /// Record `value` on first sight, otherwise compare it to the stored one
    ///
    /// Uses the identity store transform and [`JsonComparator`].
    ///
    /// ## Returns
    ///
    /// The recorded value, or the stored expectation when it matched.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty file or name, malformed extension
    /// - `CannotSaveOnCi`: no stored value while running on CI
    /// - `EmptyValue`: the value to record is an empty string
    /// - `SnapshotMismatch`: the comparator reported a difference
    /// - `Parse`/`Io`: the snapshot file could not be read or written
    pub fn record_or_compare<T>(&mut self, request: &SnapshotRequest, value: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        self.record_or_compare_with(request, value, std::convert::identity, &JsonComparator)
    }

    /// Same as [`record_or_compare`](Self::record_or_compare) with a custom
    /// store transform and comparator
    ///
    /// `store` is applied only to values about to be recorded; comparisons
    /// always see the canonical value.
    ///
    /// # Errors
    ///
    /// See [`record_or_compare`](Self::record_or_compare).
    pub fn record_or_compare_with<T, S, C>(
        &mut self,
        request: &SnapshotRequest,
        value: &T,
        store: S,
        comparator: &C,
    ) -> Result<Value>
    where
        T: Serialize + ?Sized,
        S: FnOnce(Value) -> Value,
        C: Comparator + ?Sized,
    {
        log_op_start!(
            "record_or_compare",
            file = request.file.as_str(),
            spec_name = request.name.spec_name()
        );
        let start = std::time::Instant::now();

        let result = self
            .record_or_compare_impl(request, value, store, comparator)
            .map_err(|e| {
                log_op_error!(
                    "record_or_compare",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!(
            "record_or_compare",
            duration_ms = start.elapsed().as_millis() as u64,
            outcome = result.label()
        );

        Ok(result.into_value())
    }

    fn record_or_compare_impl<T, S, C>(
        &mut self,
        request: &SnapshotRequest,
        value: &T,
        store: S,
        comparator: &C,
    ) -> Result<Reconciled>
    where
        T: Serialize + ?Sized,
        S: FnOnce(Value) -> Value,
        C: Comparator + ?Sized,
    {
        let id = self
            .counters
            .derive(&request.file, &request.name)
            .map_err(|e| ExError::from(e).with_op("record_or_compare"))?;
        let value = strip(value).map_err(|e| {
            ExError::from(e)
                .with_op("record_or_compare")
                .with_key(id.key.clone())
        })?;
        reconcile(
            &self.paths,
            &self.config,
            request,
            &id,
            value,
            store,
            comparator,
        )
    }

    /// Await a deferred value, then record or compare it
    ///
    /// The snapshot index is assigned only once the value is available, so
    /// calls are numbered in resolution order.
    ///
    /// # Errors
    ///
    /// See [`record_or_compare`](Self::record_or_compare).
    pub async fn record_or_compare_async<F>(
        &mut self,
        request: &SnapshotRequest,
        value: F,
    ) -> Result<Value>
    where
        F: IntoFuture,
        F::Output: Serialize,
    {
        let value = value.await;
        self.record_or_compare(request, &value)
    }

    /// Reset every counter, or only the counter of one test
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: the scope has an empty file or spec name
    pub fn reset_counters(&mut self, scope: Option<&ResetScope>) -> Result<()> {
        self.counters
            .reset(scope)
            .map_err(|e| ExError::from(e).with_op("reset_counters"))
    }

    /// Remove stored keys that no test of the manifest produced
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: a manifest entry is incomplete
    /// - `Parse`/`Io`: a snapshot file could not be read or written
    pub fn prune_against_manifest(
        &self,
        manifest: &[RuntimeSnapshot],
        extension: Option<&str>,
    ) -> Result<Vec<PruneReport>> {
        log_op_start!("prune_snapshots", entry_count = manifest.len());
        let start = std::time::Instant::now();

        let extension = extension.unwrap_or(self.config.extension.as_str());
        let reports = prune_files(&self.paths, manifest, extension, self.config.sort_keys)
            .map_err(|e| {
                log_op_error!(
                    "prune_snapshots",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        let pruned_count: usize = reports.iter().map(|r| r.removed.len()).sum();
        log_op_end!(
            "prune_snapshots",
            duration_ms = start.elapsed().as_millis() as u64,
            pruned_count = pruned_count
        );

        Ok(reports)
    }
}
