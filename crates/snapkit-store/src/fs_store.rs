//! Whole-file snapshot persistence
//!
//! A snapshot file is always read completely and rewritten completely; there
//! are no incremental updates.

use crate::atomic::atomic_write;
use crate::errors::{format_error, io_error, Result};
use snapkit_core::format::{decode_file, parse_snapshots, render_file};
use snapkit_core::Snapshots;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Load the snapshots stored at `path`
///
/// A missing file is an empty store. A file that parses but cannot be
/// evaluated is logged and also treated as empty.
///
/// # Errors
///
/// - `Io`: the file exists but cannot be read
/// - `Parse`: the file is not a well-formed snapshot file
pub fn load_snapshots(path: &Path) -> Result<Snapshots> {
    load_with("load_snapshots", path, decode_file)
}

/// Load the snapshots stored at `path`, failing on any unreadable entry
///
/// A missing file is still an empty store. Used by tools that rewrite or
/// report on a file, which must never mistake it for an empty one.
///
/// # Errors
///
/// - `Io`: the file exists but cannot be read
/// - `Parse`: the file is not a well-formed snapshot file
/// - `Internal`: a statement of the file cannot be evaluated
pub fn load_snapshots_strict(path: &Path) -> Result<Snapshots> {
    load_with("load_snapshots_strict", path, parse_snapshots)
}

fn load_with<D>(operation: &str, path: &Path, decode: D) -> Result<Snapshots>
where
    D: FnOnce(&str) -> snapkit_core::Result<Snapshots>,
{
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "could not find snapshots file");
            return Ok(Snapshots::new());
        }
        Err(e) => return Err(io_error(operation, path, e)),
    };

    tracing::debug!(path = %path.display(), "loading snapshots");
    decode(&source).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "could not load snapshot file");
        format_error(operation, path, e)
    })
}

/// Serialize and write the whole store, returning the written text
///
/// An empty store still writes an (empty) file.
///
/// # Errors
///
/// - `EmptyValue`: an entry holds an empty string
/// - `Io`: the directory or file cannot be written
pub fn save_snapshots(path: &Path, snapshots: &Snapshots, sort_keys: bool) -> Result<String> {
    let text = render_file(snapshots, sort_keys).map_err(|e| format_error("save_snapshots", path, e))?;
    atomic_write(path, text.as_bytes())?;
    tracing::debug!(
        path = %path.display(),
        entry_count = snapshots.len(),
        sort_keys,
        "saved snapshots"
    );
    Ok(text)
}

/// Load a snapshot file and write it back in canonical form
///
/// Returns the number of entries re-saved. The file is loaded strictly and
/// left untouched when any entry cannot be read back.
///
/// # Errors
///
/// Propagates strict load and save failures.
pub fn sort_and_save(path: &Path, sort_keys: bool) -> Result<usize> {
    let snapshots = load_snapshots_strict(path)?;
    save_snapshots(path, &snapshots, sort_keys)?;
    Ok(snapshots.len())
}
