//! Sort and resave commands
//!
//! Usage:
//! - snapkit sort <FILE>
//! - snapkit resave [--sort] <FILE>

use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Snapshot file to rewrite
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ResaveArgs {
    /// Snapshot file to rewrite
    pub file: PathBuf,

    /// Sort keys while rewriting
    #[arg(long)]
    pub sort: bool,
}

pub fn execute_sort(args: SortArgs) -> Result<(), Box<dyn std::error::Error>> {
    ensure_exists(&args.file)?;
    println!("saving sorted snapshots to {}", args.file.display());
    let count = snapkit_store::sort_and_save(&args.file, true)?;
    println!("{}", pluralize_snapshots(count));
    Ok(())
}

pub fn execute_resave(args: ResaveArgs) -> Result<(), Box<dyn std::error::Error>> {
    ensure_exists(&args.file)?;
    let count = snapkit_store::sort_and_save(&args.file, args.sort)?;
    println!(
        "resaved {} in {}",
        pluralize_snapshots(count),
        args.file.display()
    );
    Ok(())
}

/// Refuse to create a snapshot file that was never written
pub fn ensure_exists(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.is_file() {
        return Err(format!("snapshot file {} not found", file.display()).into());
    }
    Ok(())
}

fn pluralize_snapshots(count: usize) -> String {
    if count == 1 {
        "1 snapshot".to_string()
    } else {
        format!("{} snapshots", count)
    }
}
