//! Reachability queries for ModuleStore.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::store::ModuleStore;
use crate::module_id::ModuleId;

/// Transitive closure of a root set over outgoing edges, roots included.
pub type ReachabilitySet = FxHashSet<ModuleId>;

impl ModuleStore {
    /// Breadth-first closure from `roots`.
    ///
    /// Roots are part of the result even when they have no record.
    pub fn reachable_from<I>(&self, roots: I) -> ReachabilitySet
    where
        I: IntoIterator<Item = ModuleId>,
    {
        let mut visited = ReachabilitySet::default();
        let mut queue: VecDeque<ModuleId> = VecDeque::new();

        for root in roots {
            if visited.insert(root) {
                queue.push_back(root);
            }
        }

        while let Some(current) = queue.pop_front() {
            for dep in self.dependencies(current) {
                if visited.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }

        visited
    }
}
