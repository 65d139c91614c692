//! Parsed dependency references.

use crate::module_id::{ModuleId, Reserved};

/// One entry of a module's dependency list after resolution.
///
/// Plugin-qualified ids are split exactly once, here, so downstream code
/// matches on the variant instead of searching strings for `!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyRef {
    /// An ordinary module backed by a source file.
    Regular(ModuleId),
    /// `exports`, `module` or `require`.
    Reserved(Reserved),
    /// `pluginId!resourceId`.
    Plugin {
        /// Graph node for the whole `plugin!resource` id.
        id: ModuleId,
        /// The resolved plugin module.
        plugin: ModuleId,
        /// Resource text, uninterpreted.
        resource: String,
    },
}

impl DependencyRef {
    /// The graph node this reference points at.
    pub fn target(&self) -> ModuleId {
        match self {
            DependencyRef::Regular(id) => *id,
            DependencyRef::Reserved(reserved) => reserved.id(),
            DependencyRef::Plugin { id, .. } => *id,
        }
    }

    pub fn is_plugin(&self) -> bool {
        matches!(self, DependencyRef::Plugin { .. })
    }
}
