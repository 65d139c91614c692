//! Error and warning types for the tree-shaker.

use std::path::PathBuf;

use amdpack_graph::{ConfigurationError, RuntimeError};
use thiserror::Error;

/// Result type alias for tree-shaking operations.
pub type Result<T> = std::result::Result<T, ShakeError>;

/// Fatal tree-shaking failures.
#[derive(Debug, Error)]
pub enum ShakeError {
    #[error("entry point '{id}' not found at {}", .path.display())]
    EntryNotFound { id: String, path: PathBuf },

    #[error("invalid import ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A file that does not parse stops the pass.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },
}

/// Something the shaker could not resolve statically.
///
/// Never fatal: the code in question is kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Error)]
pub enum ShakeAmbiguity {
    /// A reference with no declaration in its file and no known global.
    #[error("'{name}' in '{module}' does not resolve to a declaration")]
    UnresolvedSymbol { module: String, name: String },

    /// An import whose target file does not exist under the source root.
    #[error("'{module}' imports '{specifier}', which was not found")]
    MissingImport { module: String, specifier: String },

    /// A module was asked for an export it does not declare.
    #[error("'{module}' has no export named '{name}'")]
    UnresolvedExport { module: String, name: String },
}

impl ShakeAmbiguity {
    /// The module the finding was made in.
    pub fn module(&self) -> &str {
        match self {
            ShakeAmbiguity::UnresolvedSymbol { module, .. }
            | ShakeAmbiguity::MissingImport { module, .. }
            | ShakeAmbiguity::UnresolvedExport { module, .. } => module,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguity_messages_name_the_module() {
        let missing = ShakeAmbiguity::MissingImport {
            module: "vs/base/browser/dom".to_string(),
            specifier: "./gone".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "'vs/base/browser/dom' imports './gone', which was not found"
        );
        assert_eq!(missing.module(), "vs/base/browser/dom");
    }

    #[test]
    fn entry_not_found_shows_path() {
        let err = ShakeError::EntryNotFound {
            id: "app".to_string(),
            path: PathBuf::from("/src/app.ts"),
        };
        assert_eq!(err.to_string(), "entry point 'app' not found at /src/app.ts");
    }
}
