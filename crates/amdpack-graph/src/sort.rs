//! Deterministic topological ordering.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::memory::ModuleStore;
use crate::module_id::ModuleId;

/// Order every node of `store` so that each module follows all of its
/// dependencies.
///
/// Kahn's algorithm over outgoing-edge counts: a node becomes ready once all
/// of its dependencies have been emitted. The ready set is kept ordered by id
/// string and the smallest id is always taken next, so identical inputs give
/// byte-identical orders. Nodes without any edges are included exactly once.
///
/// # Errors
///
/// [`Error::CyclicDependency`] listing every node that still has unresolved
/// dependencies when the ready set runs dry.
pub fn topological_sort(store: &ModuleStore) -> Result<Vec<ModuleId>> {
    let nodes = store.nodes();
    let mut pending: FxHashMap<ModuleId, usize> = FxHashMap::default();
    let mut ready: BTreeSet<(&str, ModuleId)> = BTreeSet::new();

    for &node in &nodes {
        match store.dependency_count(node) {
            0 => {
                ready.insert((store.name(node), node));
            }
            count => {
                pending.insert(node, count);
            }
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    while let Some((_, next)) = ready.pop_first() {
        order.push(next);
        for dependent in store.dependents(next) {
            if let Some(count) = pending.get_mut(&dependent) {
                *count -= 1;
                if *count == 0 {
                    pending.remove(&dependent);
                    ready.insert((store.name(dependent), dependent));
                }
            }
        }
    }

    if !pending.is_empty() {
        let mut remaining: Vec<String> = pending
            .keys()
            .map(|id| store.name(*id).to_string())
            .collect();
        remaining.sort();
        tracing::error!(count = remaining.len(), "dependency graph has a cycle");
        return Err(Error::CyclicDependency { remaining });
    }

    Ok(order)
}
