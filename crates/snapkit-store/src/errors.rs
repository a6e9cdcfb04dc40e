//! Error handling for snapkit-store
//!
//! Wraps snapkit-core ExError with store-specific helpers

use snapkit_core::errors::{ExError, ExErrorKind, SnapshotError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error for a path
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation)
        .with_file(path.display().to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Wrap a format error raised while handling a snapshot file
pub fn format_error(operation: &str, path: &Path, err: SnapshotError) -> ExError {
    let ex: ExError = err.into();
    let message = format!("{}: {}", path.display(), ex.message());
    ex.with_op(operation)
        .with_file(path.display().to_string())
        .with_message(message)
}

/// Create an invalid argument error
pub fn invalid_argument(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidArgument)
        .with_op(operation)
        .with_message(reason)
}
