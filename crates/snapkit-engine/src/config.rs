//! Session configuration
//!
//! Defaults come from the environment once, when a session is created.
//! Per-call options in [`SnapshotOptions`](crate::SnapshotOptions) override
//! them.

use snapkit_core_types::{DEFAULT_EXTENSION, DEFAULT_SNAPSHOT_FOLDER};

/// Snapshot folder name under the root
pub const ENV_FOLDER: &str = "SNAPKIT_FOLDER";
/// Default snapshot file extension
pub const ENV_EXTENSION: &str = "SNAPKIT_EXTENSION";
/// Mirror spec paths under the snapshot folder
pub const ENV_MIRROR: &str = "SNAPKIT_MIRROR";
/// Sort keys when saving
pub const ENV_SORT: &str = "SNAPKIT_SORT";

/// Generic variables that mark a CI run when set
///
/// Vendor-specific variables are left to the `is_ci` crate.
const CI_MARKERS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "BUILD_ID",
    "RUN_ID",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub folder: String,
    pub extension: String,
    pub mirror_relative_paths: bool,
    pub sort_keys: bool,
    pub ci: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_SNAPSHOT_FOLDER.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            mirror_relative_paths: false,
            sort_keys: true,
            ci: false,
        }
    }
}

impl SnapshotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::build(|name| std::env::var(name).ok(), is_ci::uncached())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Only the generic CI markers are consulted; vendor detection needs the
    /// real process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::build(lookup, false)
    }

    fn build<F>(lookup: F, vendor_ci: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let folder = lookup(ENV_FOLDER)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.folder);
        let extension = lookup(ENV_EXTENSION).unwrap_or(defaults.extension);
        let mirror_relative_paths = lookup(ENV_MIRROR)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.mirror_relative_paths);
        let sort_keys = lookup(ENV_SORT)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.sort_keys);
        let ci = detect_ci_with(&lookup, vendor_ci);

        tracing::debug!(
            folder = folder.as_str(),
            extension = extension.as_str(),
            mirror_relative_paths,
            sort_keys,
            ci,
            "snapshot config"
        );

        Self {
            folder,
            extension,
            mirror_relative_paths,
            sort_keys,
            ci,
        }
    }
}

/// Whether the process runs under continuous integration
pub fn detect_ci() -> bool {
    detect_ci_with(&|name: &str| std::env::var(name).ok(), is_ci::uncached())
}

/// `CI=false` or `CI=0` turns detection off regardless of other markers.
fn detect_ci_with<F>(lookup: &F, vendor_ci: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("CI") {
        if parse_flag(&v) == Some(false) {
            return false;
        }
    }
    vendor_ci
        || CI_MARKERS
            .iter()
            .any(|name| lookup(name).is_some_and(|v| !v.trim().is_empty()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = SnapshotConfig::from_lookup(lookup(&[]));
        assert_eq!(config, SnapshotConfig::default());
        assert_eq!(config.folder, "__snapshots__");
        assert_eq!(config.extension, ".snapshot.js");
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = SnapshotConfig::from_lookup(lookup(&[
            (ENV_FOLDER, "golden"),
            (ENV_EXTENSION, ".snap"),
            (ENV_MIRROR, "yes"),
            (ENV_SORT, "off"),
        ]));
        assert_eq!(config.folder, "golden");
        assert_eq!(config.extension, ".snap");
        assert!(config.mirror_relative_paths);
        assert!(!config.sort_keys);
    }

    #[test]
    fn test_unparseable_flag_keeps_default() {
        let config = SnapshotConfig::from_lookup(lookup(&[(ENV_SORT, "maybe")]));
        assert!(config.sort_keys);
    }

    #[test]
    fn test_ci_detection() {
        assert!(detect_ci_with(&lookup(&[("CI", "true")]), false));
        assert!(detect_ci_with(&lookup(&[("BUILD_NUMBER", "17")]), false));
        assert!(!detect_ci_with(&lookup(&[]), false));
    }

    #[test]
    fn test_vendor_detection_counts() {
        assert!(detect_ci_with(&lookup(&[]), true));
        assert!(detect_ci_with(&lookup(&[("CI", "maybe")]), true));
    }

    #[test]
    fn test_ci_false_wins() {
        assert!(!detect_ci_with(&lookup(&[("CI", "false"), ("RUN_ID", "3")]), false));
        assert!(!detect_ci_with(&lookup(&[("CI", "0")]), true));
    }

    #[test]
    fn test_ci_flows_into_config() {
        let config = SnapshotConfig::from_lookup(lookup(&[("CONTINUOUS_INTEGRATION", "1")]));
        assert!(config.ci);
        assert!(SnapshotConfig::build(lookup(&[]), true).ci);
    }
}
