//! Module records.

use std::path::PathBuf;
use std::sync::Arc;

use crate::dependency::DependencyRef;
use crate::module_id::ModuleId;

/// Where a module's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// A physical file, read once during discovery.
    Source { path: PathBuf, text: Arc<str> },
    /// A `plugin!resource` id; its content is produced by the plugin.
    Plugin { plugin: ModuleId, resource: String },
}

/// A discovered module.
///
/// Records are immutable once registered in a [`ModuleStore`](crate::ModuleStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub kind: ModuleKind,
    /// Resolved dependencies in declaration order.
    pub dependencies: Vec<DependencyRef>,
}

impl Module {
    /// Create a record for a module read from disk.
    pub fn source(
        id: ModuleId,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
        dependencies: Vec<DependencyRef>,
    ) -> Self {
        Self {
            id,
            kind: ModuleKind::Source {
                path: path.into(),
                text: text.into(),
            },
            dependencies,
        }
    }

    /// Create a record for a plugin resource.
    ///
    /// The only dependency of such a node is the plugin module itself.
    pub fn plugin(id: ModuleId, plugin: ModuleId, resource: impl Into<String>) -> Self {
        Self {
            id,
            kind: ModuleKind::Plugin {
                plugin,
                resource: resource.into(),
            },
            dependencies: vec![DependencyRef::Regular(plugin)],
        }
    }

    pub fn is_plugin(&self) -> bool {
        matches!(self.kind, ModuleKind::Plugin { .. })
    }

    /// Source text, if this module was read from disk.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ModuleKind::Source { text, .. } => Some(text),
            ModuleKind::Plugin { .. } => None,
        }
    }

    pub fn source_path(&self) -> Option<&PathBuf> {
        match &self.kind {
            ModuleKind::Source { path, .. } => Some(path),
            ModuleKind::Plugin { .. } => None,
        }
    }
}
