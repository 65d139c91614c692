//! Which modules go into a bundle, and in what order.

use amdpack_config::EntryPointSpec;
use amdpack_graph::{ConfigurationError, ModuleId, ModuleStore, ReachabilitySet, resolve};

/// Module ids of the bundle for `spec`, in global order.
///
/// `reachable({name} ∪ include)` minus `reachable(exclude_i)` for every
/// exclude root, minus the reserved pseudo-modules, filtered out of `order`.
/// An excluded subgraph is removed as a whole, even where a kept module also
/// reaches it through another path.
pub fn bundle_members(
    store: &mut ModuleStore,
    spec: &EntryPointSpec,
    order: &[ModuleId],
) -> Result<Vec<ModuleId>, ConfigurationError> {
    let roots = resolve_roots(store, spec.roots())?;
    let excluded = resolve_roots(store, spec.exclude.iter().map(String::as_str))?;

    let mut members: ReachabilitySet = store.reachable_from(roots);
    for root in excluded {
        for id in store.reachable_from([root]) {
            members.remove(&id);
        }
    }
    members.retain(|id| !id.is_reserved());

    Ok(order
        .iter()
        .copied()
        .filter(|id| members.contains(id))
        .collect())
}

fn resolve_roots<'a>(
    store: &mut ModuleStore,
    ids: impl Iterator<Item = &'a str>,
) -> Result<Vec<ModuleId>, ConfigurationError> {
    ids.map(|raw| resolve(store.ids_mut(), None, raw).map(|dep| dep.target()))
        .collect()
}
