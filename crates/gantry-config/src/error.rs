//! Error types for manifest loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No manifest file was found in the project root or any parent.
    #[error("no gantry.toml found. Run 'gantry init' to scaffold one")]
    NotFound,

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("invalid output pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("no entry points defined. Add at least one under [entries]")]
    NoEntries,

    #[error("duplicate rule name '{0}' in the transform table")]
    DuplicateRule(String),

    #[error("source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("entry point '{name}' not found: {path}")]
    EntryNotFound { name: String, path: PathBuf },

    /// Page discovery could not read the pages directory. This is fatal:
    /// the build plan cannot be finalized without the page list.
    #[error("pages directory is not readable: {path}")]
    PagesDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            hint: hint.into(),
        }
    }
}
