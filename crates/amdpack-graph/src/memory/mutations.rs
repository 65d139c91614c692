//! Mutation methods for ModuleStore.

use super::store::ModuleStore;
use crate::module::Module;
use crate::module_id::ModuleId;

impl ModuleStore {
    /// Register a module record and the edges to its dependencies.
    ///
    /// Records are immutable: returns `false` and leaves the store unchanged
    /// if a record with the same id already exists.
    pub fn insert(&mut self, module: Module) -> bool {
        if self.modules.contains_key(&module.id) {
            return false;
        }

        let from = module.id;
        let targets: Vec<ModuleId> = module.dependencies.iter().map(|dep| dep.target()).collect();
        self.modules.insert(from, module);
        for to in targets {
            self.add_dependency(from, to);
        }
        true
    }

    /// Add a dependency edge, creating forward and reverse mappings.
    pub fn add_dependency(&mut self, from: ModuleId, to: ModuleId) {
        // HashSet prevents duplicate edges
        self.outgoing.entry(from).or_default().insert(to);
        self.incoming.entry(to).or_default().insert(from);
    }

    /// Mark a module as an entry point. Duplicates are ignored.
    pub fn add_entry_point(&mut self, id: ModuleId) {
        if !self.entry_points.contains(&id) {
            self.entry_points.push(id);
        }
    }
}
