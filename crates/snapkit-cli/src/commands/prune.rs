//! Prune command
//!
//! Usage: snapkit prune --manifest <JSON> [--ext <EXT>] [--root <DIR>]
//!
//! The manifest is a JSON array of `{"file": ..., "specName": ...}` entries,
//! one per test that ran.

use clap::Args;
use snapkit_core::RuntimeSnapshot;
use snapkit_engine::{SnapshotConfig, SnapshotSession};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// JSON manifest of the tests that ran
    #[arg(long)]
    pub manifest: PathBuf,

    /// Snapshot file extension (defaults to the configured one)
    #[arg(long)]
    pub ext: Option<String>,

    /// Directory holding the snapshot folder (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub fn execute(args: PruneArgs) -> Result<(), Box<dyn std::error::Error>> {
    let manifest_text = std::fs::read_to_string(&args.manifest)
        .map_err(|e| format!("cannot read manifest {}: {}", args.manifest.display(), e))?;
    let manifest: Vec<RuntimeSnapshot> = serde_json::from_str(&manifest_text)?;

    let session = match args.root {
        Some(root) => SnapshotSession::with_root(root, SnapshotConfig::from_env()),
        None => SnapshotSession::new()?,
    };
    let reports = session.prune_against_manifest(&manifest, args.ext.as_deref())?;

    for report in &reports {
        let path = session.paths().relative_display(&report.path);
        if report.rewritten {
            println!("{}: pruned {}", path, report.removed.join(", "));
        } else {
            println!("{}: nothing to prune", path);
        }
    }
    Ok(())
}
