//! Snapshot values and the canonical stripping step
//!
//! Everything that reaches the store is a [`serde_json::Value`]. Values coming
//! from a test are first pushed through a JSON round-trip so that the value
//! compared in memory is exactly the value that would be persisted.

use crate::errors::{Result, SnapshotError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Mapping of snapshot key to recorded value, in insertion order
pub type Snapshots = Map<String, Value>;

/// Canonicalize a test value through a JSON round-trip
///
/// Non-finite floats become `null` and map keys become strings, mirroring
/// what the snapshot file can represent.
///
/// # Errors
///
/// - `Serialization`: the value cannot be represented as JSON (for example a
///   map with non-string keys that do not serialize as strings)
pub fn strip<T>(value: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).map_err(SnapshotError::from)
}

/// True when the value is a string with no content
pub fn is_empty_text(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
