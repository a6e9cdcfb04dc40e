//! Show command
//!
//! Usage: snapkit show <FILE>

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Snapshot file to print
    pub file: PathBuf,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    super::resave::ensure_exists(&args.file)?;
    let snapshots = snapkit_store::load_snapshots_strict(&args.file)?;
    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    Ok(())
}
