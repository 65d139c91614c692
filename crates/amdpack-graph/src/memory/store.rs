//! Core ModuleStore definition.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::module::Module;
use crate::module_id::{IdInterner, ModuleId};

/// Store of module records and dependency edges.
///
/// Owns the id-interning table; every other component refers to modules by
/// [`ModuleId`] and looks records up here.
#[derive(Debug, Clone, Default)]
pub struct ModuleStore {
    pub(super) ids: IdInterner,
    pub(super) modules: FxHashMap<ModuleId, Module>,
    pub(super) outgoing: FxHashMap<ModuleId, FxHashSet<ModuleId>>,
    pub(super) incoming: FxHashMap<ModuleId, FxHashSet<ModuleId>>,
    pub(super) entry_points: Vec<ModuleId>,
}

impl ModuleStore {
    /// Create an empty store whose interner already holds the reserved ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id-interning table.
    pub fn ids(&self) -> &IdInterner {
        &self.ids
    }

    /// Mutable access to the id-interning table, for resolution.
    pub fn ids_mut(&mut self) -> &mut IdInterner {
        &mut self.ids
    }
}
