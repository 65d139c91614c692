//! Smoke tests for amdpack-graph.
//!
//! Fast, deterministic checks of store invariants. Randomized versions live
//! in property_tests.rs (requires the proptest feature).

use crate::{DependencyRef, Module, ModuleStore};

fn regular(store: &mut ModuleStore, name: &str) -> DependencyRef {
    DependencyRef::Regular(store.ids_mut().intern(name))
}

#[test]
fn test_dependency_dependent_symmetry() {
    let mut store = ModuleStore::new();
    let app = store.ids_mut().intern("app");
    let deps = vec![regular(&mut store, "util"), regular(&mut store, "legacy")];
    store.insert(Module::source(app, "app.ts", "define([], {})", deps));

    for dep in store.dependencies(app).collect::<Vec<_>>() {
        assert!(store.dependents(dep).any(|d| d == app));
    }
    assert_eq!(store.dependency_count(app), 2);
}

#[test]
fn test_records_are_immutable() {
    let mut store = ModuleStore::new();
    let app = store.ids_mut().intern("app");
    assert!(store.insert(Module::source(app, "app.ts", "first", Vec::new())));
    assert!(!store.insert(Module::source(app, "app.ts", "second", Vec::new())));
    assert_eq!(store.get(app).and_then(|m| m.text()), Some("first"));
}

#[test]
fn test_duplicate_edges_collapse() {
    let mut store = ModuleStore::new();
    let a = store.ids_mut().intern("a");
    let b = store.ids_mut().intern("b");
    store.add_dependency(a, b);
    store.add_dependency(a, b);
    assert_eq!(store.dependency_count(a), 1);
    assert_eq!(store.dependents(b).count(), 1);
}

#[test]
fn test_nodes_include_edge_endpoints() {
    let mut store = ModuleStore::new();
    let a = store.ids_mut().intern("a");
    let b = store.ids_mut().intern("b");
    store.add_dependency(a, b);
    assert!(store.is_empty());
    assert_eq!(store.nodes(), [a, b]);
}

#[test]
fn test_reachability_is_a_closure() {
    let mut store = ModuleStore::new();
    let names = ["app", "util", "legacy", "oldUtil", "unrelated"];
    let ids: Vec<_> = names.iter().map(|n| store.ids_mut().intern(n)).collect();
    store.add_dependency(ids[0], ids[1]);
    store.add_dependency(ids[0], ids[2]);
    store.add_dependency(ids[2], ids[3]);

    let reached = store.reachable_from([ids[0]]);
    assert_eq!(reached.len(), 4);
    assert!(!reached.contains(&ids[4]));

    let legacy = store.reachable_from([ids[2]]);
    assert!(legacy.contains(&ids[2]) && legacy.contains(&ids[3]));
    assert_eq!(legacy.len(), 2);
}

#[test]
fn test_needed_by_chain_prefers_shortest_path() {
    let mut store = ModuleStore::new();
    let app = store.ids_mut().intern("app");
    let long = store.ids_mut().intern("long");
    let longer = store.ids_mut().intern("longer");
    let target = store.ids_mut().intern("target");
    store.add_entry_point(app);
    store.add_dependency(app, long);
    store.add_dependency(long, longer);
    store.add_dependency(longer, target);
    store.add_dependency(app, target);

    let chain = store.needed_by_chain(target).unwrap();
    assert_eq!(chain.format_chain(), "app -> target");
}

#[test]
fn test_needed_by_chain_unreachable() {
    let mut store = ModuleStore::new();
    let orphan = store.ids_mut().intern("orphan");
    assert!(store.needed_by_chain(orphan).is_none());
}
