//! Machine-readable summary of a build, written as `bundleInfo.json`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use amdpack_graph::ModuleStore;

/// File name the report is written under.
pub const BUNDLE_INFO_FILE: &str = "bundleInfo.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleData {
    /// Every discovered module and its direct dependencies, sorted by id.
    pub graph: IndexMap<String, Vec<String>>,
    /// Entry point name to the module ids in its bundle, in bundle order.
    pub bundles: IndexMap<String, Vec<String>>,
}

impl BundleData {
    /// Capture the dependency graph of `store`.
    pub fn from_store(store: &ModuleStore) -> Self {
        let mut modules: Vec<_> = store.modules().collect();
        modules.sort_by(|a, b| store.name(a.id).cmp(store.name(b.id)));

        let graph = modules
            .into_iter()
            .map(|module| {
                let deps = module
                    .dependencies
                    .iter()
                    .map(|dep| store.name(dep.target()).to_string())
                    .collect();
                (store.name(module.id).to_string(), deps)
            })
            .collect();

        Self {
            graph,
            bundles: IndexMap::new(),
        }
    }

    pub fn record_bundle(&mut self, entry: impl Into<String>, modules: Vec<String>) {
        self.bundles.insert(entry.into(), modules);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
