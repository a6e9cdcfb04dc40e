//! Pruning of snapshot files against a run manifest

#![allow(clippy::result_large_err)]

use serde::Serialize;
use snapkit_core::errors::ExError;
use snapkit_core::{prune_in_object, RuntimeSnapshot};
use snapkit_store::{load_snapshots, save_snapshots, Result, SnapshotPaths};
use std::path::PathBuf;

/// What pruning did to one snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Spec file as named in the manifest
    pub file: String,
    pub path: PathBuf,
    /// Keys dropped, in stored order
    pub removed: Vec<String>,
    pub rewritten: bool,
}

/// Prune every snapshot file referenced by the manifest
///
/// Files are visited in the order they first appear in the manifest. A file
/// with no stored snapshots is skipped, and a file is only rewritten when
/// something was removed.
///
/// # Errors
///
/// - `InvalidArgument`: a manifest entry is incomplete or the extension is malformed
/// - `Parse`/`Io`: a snapshot file could not be read or written
pub fn prune_files(
    paths: &SnapshotPaths,
    manifest: &[RuntimeSnapshot],
    extension: &str,
    sort_keys: bool,
) -> Result<Vec<PruneReport>> {
    for entry in manifest {
        entry
            .validate()
            .map_err(|e| ExError::from(e).with_op("prune_snapshots"))?;
    }

    let mut reports = Vec::new();
    for (file, runtime) in group_by_file(manifest) {
        let path = paths.resolve(file, extension)?;
        let stored = load_snapshots(&path)?;
        if stored.is_empty() {
            tracing::debug!(file, "empty snapshot file");
            reports.push(PruneReport {
                file: file.to_string(),
                path,
                removed: Vec::new(),
                rewritten: false,
            });
            continue;
        }

        let kept = prune_in_object(&runtime, &stored)
            .map_err(|e| ExError::from(e).with_op("prune_snapshots").with_file(file))?;
        let removed: Vec<String> = stored
            .keys()
            .filter(|key| !kept.contains_key(key.as_str()))
            .cloned()
            .collect();

        let rewritten = !removed.is_empty();
        if rewritten {
            tracing::debug!(file, pruned_count = removed.len(), "saving pruned snapshot file");
            save_snapshots(&path, &kept, sort_keys)?;
        } else {
            tracing::debug!(file, "nothing to prune");
        }

        reports.push(PruneReport {
            file: file.to_string(),
            path,
            removed,
            rewritten,
        });
    }
    Ok(reports)
}

/// Group manifest entries by file, keeping first-seen file order
fn group_by_file(manifest: &[RuntimeSnapshot]) -> Vec<(&str, Vec<RuntimeSnapshot>)> {
    let mut groups: Vec<(&str, Vec<RuntimeSnapshot>)> = Vec::new();
    for entry in manifest {
        match groups.iter_mut().find(|(file, _)| *file == entry.file) {
            Some((_, entries)) => entries.push(entry.clone()),
            None => groups.push((entry.file.as_str(), vec![entry.clone()])),
        }
    }
    groups
}
