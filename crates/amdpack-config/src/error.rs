//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors (for CLI use)
    #[error("source root not found: {0}")]
    SourceRootNotFound(PathBuf),

    #[error("file {} listed by entry point '{entry}' not found", .path.display())]
    PrependNotFound { entry: String, path: PathBuf },

    // Config parsing/loading errors
    #[error("config not found (looked for amdpack.toml and amdpack.json)")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    // Schema validation errors (no filesystem checks)
    #[error("duplicate entry point '{0}'")]
    DuplicateEntryPoint(String),

    #[error("entry point #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("entry point '{entry}' has an empty module id in '{list}'")]
    EmptyModuleId { entry: String, list: &'static str },

    #[error("invalid import_ignore_pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(": {hint}"),
        None => String::new(),
    }
}
