//! Error types for graph construction and ordering.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RuntimeError;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Build configuration defects.
///
/// These are never transient: the dependency graph or the entry point list
/// has to be fixed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("duplicate entry point '{0}'")]
    DuplicateEntryPoint(String),

    #[error("empty module id{}", from_suffix(.from))]
    EmptyId { from: Option<String> },

    #[error("cannot resolve relative dependency '{spec}'{}", from_suffix(.from))]
    UnresolvableRelative { spec: String, from: Option<String> },

    #[error("invalid plugin reference '{spec}': {reason}")]
    InvalidPlugin { spec: String, reason: String },

    #[error(
        "missing source file for module '{id}' at {}{}",
        .path.display(),
        chain_suffix(.needed_by)
    )]
    MissingSource {
        id: String,
        path: PathBuf,
        /// Modules leading from an entry point to `id`, entry first.
        needed_by: Vec<String>,
    },

    #[error("module id '{id}' maps to {} which is outside the source root", .path.display())]
    PathOutsideRoot { id: String, path: PathBuf },

    #[error("module '{id}' ({}) does not contain a define( call", .path.display())]
    MissingDefine { id: String, path: PathBuf },
}

/// Error types for graph operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Kahn's algorithm could not drain every node.
    #[error(
        "Cannot do topological sort on cyclic graph, remaining nodes: {}",
        .remaining.join(", ")
    )]
    CyclicDependency { remaining: Vec<String> },

    #[error("Failed to read '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },
}

fn from_suffix(from: &Option<String>) -> String {
    match from {
        Some(from) => format!(" (imported by '{from}')"),
        None => String::new(),
    }
}

fn chain_suffix(chain: &[String]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" (needed by {})", chain.join(" -> "))
    }
}
