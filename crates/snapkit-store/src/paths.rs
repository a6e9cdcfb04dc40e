//! Snapshot file locations
//!
//! Snapshot files live in a fixed folder under the working directory the
//! process started in. The root is captured once, so later `chdir` calls do
//! not move the store.

use crate::errors::{invalid_argument, Result};
use snapkit_core_types::DEFAULT_SNAPSHOT_FOLDER;
use std::path::{Component, Path, PathBuf};

/// Resolves spec files to snapshot files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    root: PathBuf,
    folder: String,
    mirror_relative: bool,
}

impl SnapshotPaths {
    /// Anchor at `root` using the default folder and flat file names
    ///
    /// A relative root is made absolute against the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&root))
                .unwrap_or(root)
        };
        Self {
            root,
            folder: DEFAULT_SNAPSHOT_FOLDER.to_string(),
            mirror_relative: false,
        }
    }

    /// Anchor at the current working directory
    ///
    /// # Errors
    ///
    /// - `Io`: the current directory cannot be read
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| crate::errors::io_error("current_dir", Path::new("."), e))?;
        Ok(Self::new(cwd))
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Keep the spec file's relative directory structure under the folder
    pub fn with_mirror_relative(mut self, mirror: bool) -> Self {
        self.mirror_relative = mirror;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    /// Absolute snapshot file path for a spec file
    ///
    /// The extension is appended unless the name already ends with it. An
    /// empty extension appends nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: empty spec file, a spec path without a file
    ///   name, or an extension not starting with `.`
    pub fn resolve(&self, spec_file: &str, extension: &str) -> Result<PathBuf> {
        validate_extension(extension)?;
        if spec_file.is_empty() {
            return Err(invalid_argument("resolve_snapshot_path", "missing spec file"));
        }

        let spec_path = Path::new(spec_file);
        let relative = if self.mirror_relative {
            self.mirrored(spec_path)
        } else {
            None
        };
        let relative = match relative {
            Some(relative) => relative,
            None => PathBuf::from(spec_path.file_name().ok_or_else(|| {
                invalid_argument(
                    "resolve_snapshot_path",
                    format!("spec file {:?} has no file name", spec_file),
                )
            })?),
        };

        let mut name = relative.as_os_str().to_os_string();
        if !relative.to_string_lossy().ends_with(extension) {
            name.push(extension);
        }
        Ok(self.folder().join(name))
    }

    /// Spec path relative to the root, if it stays inside it
    fn mirrored(&self, spec_path: &Path) -> Option<PathBuf> {
        let relative = if spec_path.is_absolute() {
            spec_path.strip_prefix(&self.root).ok()?
        } else {
            spec_path
        };
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if clean.as_os_str().is_empty() {
            return None;
        }
        Some(clean)
    }

    /// Display form of a path relative to the root
    pub fn relative_display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// # Errors
///
/// - `InvalidArgument`: a non-empty extension that does not start with `.`
pub fn validate_extension(extension: &str) -> Result<()> {
    if !extension.is_empty() && !extension.starts_with('.') {
        return Err(invalid_argument(
            "resolve_snapshot_path",
            format!("extension should start with '.', got {:?}", extension),
        ));
    }
    Ok(())
}
