//! Pruning of stale snapshot keys
//!
//! A stored key survives when some test that actually ran has a name that is
//! a prefix of it, which accounts for the ` <n>` suffix of auto keys.

use crate::errors::{Result, SnapshotError};
use crate::value::Snapshots;
use serde::{Deserialize, Serialize};

/// One test observed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSnapshot {
    pub file: String,
    pub spec_name: String,
}

impl RuntimeSnapshot {
    pub fn new(file: impl Into<String>, spec_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            spec_name: spec_name.into(),
        }
    }

    /// # Errors
    ///
    /// - `InvalidArgument`: the file or spec name is empty
    pub fn validate(&self) -> Result<()> {
        if self.file.is_empty() || self.spec_name.is_empty() {
            return Err(SnapshotError::invalid_argument(format!(
                "invalid runtime snapshot {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Keep only the stored entries produced by a test of the run
///
/// The relative order of the kept entries is preserved.
///
/// # Errors
///
/// - `InvalidArgument`: a runtime entry has an empty file or spec name
pub fn prune_in_object(runtime: &[RuntimeSnapshot], stored: &Snapshots) -> Result<Snapshots> {
    for entry in runtime {
        entry.validate()?;
    }
    tracing::debug!(names = runtime.len(), "pruning snapshots");

    let kept: Snapshots = stored
        .iter()
        .filter(|(key, _)| {
            runtime
                .iter()
                .any(|entry| key.starts_with(entry.spec_name.as_str()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    tracing::debug!(remaining = kept.len(), "after pruning");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> Snapshots {
        let mut snapshots = Snapshots::new();
        snapshots.insert("a".into(), json!(1));
        snapshots.insert("b".into(), json!(2));
        snapshots.insert("c".into(), json!(3));
        snapshots
    }

    #[test]
    fn test_keeps_only_present_names() {
        let runtime = vec![RuntimeSnapshot::new("spec.rs", "a")];
        let kept = prune_in_object(&runtime, &stored()).unwrap();

        let mut expected = Snapshots::new();
        expected.insert("a".into(), json!(1));
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_prefix_match_keeps_indexed_keys() {
        let mut snapshots = Snapshots::new();
        snapshots.insert("works 1".into(), json!("x"));
        snapshots.insert("works 2".into(), json!("y"));
        snapshots.insert("gone 1".into(), json!("z"));

        let runtime = vec![RuntimeSnapshot::new("spec.rs", "works")];
        let kept = prune_in_object(&runtime, &snapshots).unwrap();
        let keys: Vec<&String> = kept.keys().collect();
        assert_eq!(keys, ["works 1", "works 2"]);
    }

    #[test]
    fn test_empty_runtime_drops_everything() {
        assert!(prune_in_object(&[], &stored()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_runtime_entry() {
        let runtime = vec![RuntimeSnapshot::new("spec.rs", "")];
        assert!(matches!(
            prune_in_object(&runtime, &stored()),
            Err(SnapshotError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_manifest_json_shape() {
        let entry: RuntimeSnapshot =
            serde_json::from_str(r#"{"file": "spec.rs", "specName": "a"}"#).unwrap();
        assert_eq!(entry, RuntimeSnapshot::new("spec.rs", "a"));
    }
}
