//! Needed-by chains for error reporting.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::store::ModuleStore;
use crate::dependency_chain::DependencyChain;
use crate::module_id::ModuleId;

impl ModuleStore {
    /// Shortest chain of modules leading from an entry point to `target`.
    ///
    /// Walks incoming edges backwards from `target` until an entry point is
    /// met. Returns `None` when `target` is not reachable from any entry
    /// point, and a single-element chain when `target` is itself an entry.
    pub fn needed_by_chain(&self, target: ModuleId) -> Option<DependencyChain> {
        let mut next_hop: FxHashMap<ModuleId, ModuleId> = FxHashMap::default();
        let mut queue = VecDeque::from([target]);
        next_hop.insert(target, target);

        while let Some(current) = queue.pop_front() {
            if self.is_entry_point(current) {
                let mut path = vec![self.name(current).to_string()];
                let mut cursor = current;
                while cursor != target {
                    cursor = next_hop[&cursor];
                    path.push(self.name(cursor).to_string());
                }
                return Some(DependencyChain::new(path));
            }

            let mut dependents: Vec<ModuleId> = self.dependents(current).collect();
            dependents.sort_unstable_by(|a, b| self.name(*a).cmp(self.name(*b)));
            for dependent in dependents {
                if !next_hop.contains_key(&dependent) {
                    next_hop.insert(dependent, current);
                    queue.push_back(dependent);
                }
            }
        }

        None
    }
}
