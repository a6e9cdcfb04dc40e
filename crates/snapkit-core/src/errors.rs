use thiserror::Error;

/// Result type alias using SnapshotError
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Stable reference explaining why new snapshots are refused on CI
pub const CI_REFERENCE_URL: &str = "https://github.com/bahmutov/snap-shot-core/issues/5";

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input
    InvalidArgument,
    EmptyValue,

    // Reconciliation outcomes
    CannotSaveOnCi,
    SnapshotMismatch,

    // Snapshot file handling
    Parse,
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::EmptyValue => "ERR_EMPTY_VALUE",
            ExErrorKind::CannotSaveOnCi => "ERR_CANNOT_SAVE_ON_CI",
            ExErrorKind::SnapshotMismatch => "ERR_SNAPSHOT_MISMATCH",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the snapshot
/// identity (file and key) the failure relates to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    file: Option<String>,
    key: Option<String>,
    line: Option<usize>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            file: None,
            key: None,
            line: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add snapshot file context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add snapshot key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add source line context (1-based)
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, "\ncaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for snapshot operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// A required identity field or option was missing or malformed
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Attempt to store an empty string
    #[error("Cannot store empty value for snapshot \"{key}\"")]
    EmptyValue { key: String },

    /// No recorded expectation exists and writes are disabled on CI
    #[error(
        "Cannot store new snapshot value\nin {file}\nfor spec called \"{spec_name}\"\ntest key \"{key}\"\nwhen running on CI (opts.ci = 1)\nsee {}",
        CI_REFERENCE_URL
    )]
    CannotSaveOnCi {
        file: String,
        spec_name: String,
        key: String,
    },

    /// The comparator reported a difference
    #[error("Different value of snapshot \"{spec_name}\"\n{message}")]
    SnapshotMismatch { spec_name: String, message: String },

    /// Snapshot file is not syntactically valid
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Snapshot file parsed but a statement could not be evaluated
    #[error("Evaluation error at line {line}: {message}")]
    Evaluation { line: usize, message: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl SnapshotError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        SnapshotError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Conversion from SnapshotError to ExError
impl From<SnapshotError> for ExError {
    fn from(err: SnapshotError) -> Self {
        let message = err.to_string();
        match err {
            SnapshotError::InvalidArgument { .. } => {
                ExError::new(ExErrorKind::InvalidArgument).with_message(message)
            }
            SnapshotError::EmptyValue { key } => ExError::new(ExErrorKind::EmptyValue)
                .with_key(key)
                .with_message(message),
            SnapshotError::CannotSaveOnCi { file, key, .. } => {
                ExError::new(ExErrorKind::CannotSaveOnCi)
                    .with_file(file)
                    .with_key(key)
                    .with_message(message)
            }
            SnapshotError::SnapshotMismatch { spec_name, .. } => {
                ExError::new(ExErrorKind::SnapshotMismatch)
                    .with_key(spec_name)
                    .with_message(message)
            }
            SnapshotError::Parse { line, .. } => ExError::new(ExErrorKind::Parse)
                .with_line(line)
                .with_message(message),
            SnapshotError::Evaluation { line, .. } => ExError::new(ExErrorKind::Internal)
                .with_line(line)
                .with_message(message),
            SnapshotError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to SnapshotError
impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Serialization {
            message: err.to_string(),
        }
    }
}
