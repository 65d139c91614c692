//! Query methods for ModuleStore.

use super::store::ModuleStore;
use crate::module::Module;
use crate::module_id::ModuleId;

impl ModuleStore {
    /// Retrieve a module record by id.
    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    /// The string form of `id`.
    pub fn name(&self, id: ModuleId) -> &str {
        self.ids.name(id)
    }

    /// Look up the id of an already interned name.
    pub fn id_of(&self, name: &str) -> Option<ModuleId> {
        self.ids.get(name)
    }

    /// Iterate over all module records, in no particular order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Number of module records.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Direct dependencies of `id`.
    pub fn dependencies(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.outgoing
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of distinct outgoing edges of `id`.
    pub fn dependency_count(&self, id: ModuleId) -> usize {
        self.outgoing.get(&id).map_or(0, |set| set.len())
    }

    /// Modules that directly depend on `id`.
    pub fn dependents(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.incoming
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Every graph node: module records plus all edge endpoints.
    ///
    /// Sorted by id string, so callers iterating it stay deterministic.
    pub fn nodes(&self) -> Vec<ModuleId> {
        let mut nodes: Vec<ModuleId> = self
            .modules
            .keys()
            .chain(self.outgoing.keys())
            .chain(self.incoming.keys())
            .copied()
            .collect();
        nodes.sort_unstable_by(|a, b| self.name(*a).cmp(self.name(*b)));
        nodes.dedup();
        nodes
    }

    /// Entry points in registration order.
    pub fn entry_points(&self) -> &[ModuleId] {
        &self.entry_points
    }

    pub fn is_entry_point(&self, id: ModuleId) -> bool {
        self.entry_points.contains(&id)
    }
}
