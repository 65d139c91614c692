//! Dependency chains for explaining why a module is part of a build.

use serde::{Deserialize, Serialize};

/// A chain of module ids from an entry point to a target module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyChain {
    /// Module ids from entry to target
    pub path: Vec<String>,
    /// Depth of this chain (path length - 1)
    pub depth: usize,
}

impl DependencyChain {
    /// Create a new dependency chain from a path.
    pub fn new(path: Vec<String>) -> Self {
        let depth = path.len().saturating_sub(1);
        Self { path, depth }
    }

    /// Get the entry point (first module in the chain).
    pub fn entry_point(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    /// Get the target (last module in the chain).
    pub fn target(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Modules that needed the target, entry point first.
    pub fn needed_by(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Format the chain as a human-readable string.
    ///
    /// Example: "app -> util -> helper"
    pub fn format_chain(&self) -> String {
        self.path.join(" -> ")
    }
}
