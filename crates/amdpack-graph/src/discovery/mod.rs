//! Dependency discovery.
//!
//! Breadth-first traversal from a set of entry ids. Every reachable module is
//! read exactly once, pre-scanned for dependencies, and registered in a
//! [`ModuleStore`]. Discovery order never influences output order; that is
//! the topological sort's job.

mod scanner;
mod validation;

pub use scanner::scan_dependencies;
pub use validation::module_path;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{ConfigurationError, Error, Result};
use crate::memory::ModuleStore;
use crate::module::Module;
use crate::module_id::ModuleId;
use crate::resolve::resolve;
use crate::runtime::{Runtime, RuntimeError, read_text};

/// File extension appended to module ids when no other is configured.
pub const DEFAULT_EXTENSION: &str = "ts";

/// Walks the dependency graph of a set of entry points.
#[derive(Debug, Clone)]
pub struct Discoverer {
    root: PathBuf,
    extension: String,
    runtime: Arc<dyn Runtime>,
}

impl Discoverer {
    /// Create a discoverer reading `<root>/<id>.ts` files through `runtime`.
    pub fn new(root: impl Into<PathBuf>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            runtime,
        }
    }

    /// Use a different source file extension. A leading `.` is ignored.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Discover everything reachable from `entry_ids` into a fresh store.
    pub async fn discover<S: AsRef<str>>(&self, entry_ids: &[S]) -> Result<ModuleStore> {
        let mut store = ModuleStore::new();
        self.discover_into(&mut store, entry_ids).await?;
        Ok(store)
    }

    /// Discover everything reachable from `entry_ids` into `store`.
    ///
    /// Modules already present in `store` are not read again.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingSource`] when a required file does not
    ///   exist, with the chain of modules that needed it
    /// - [`ConfigurationError::UnresolvableRelative`] for relative ids that
    ///   cannot be resolved
    /// - [`Error::ReadFile`] for any other I/O failure
    pub async fn discover_into<S: AsRef<str>>(
        &self,
        store: &mut ModuleStore,
        entry_ids: &[S],
    ) -> Result<()> {
        let mut queue: VecDeque<ModuleId> = VecDeque::new();
        let mut in_queue: FxHashSet<ModuleId> = FxHashSet::default();

        for raw in entry_ids {
            let id = resolve(store.ids_mut(), None, raw.as_ref())?.target();
            store.add_entry_point(id);
            if in_queue.insert(id) {
                queue.push_back(id);
            }
        }

        while let Some(id) = queue.pop_front() {
            if id.is_reserved() || store.contains(id) {
                continue;
            }

            let name = store.name(id).to_string();
            if let Some((plugin_name, resource)) = name.split_once('!') {
                // Plugin resources are never read from disk.
                let plugin = store.ids_mut().intern(plugin_name);
                store.insert(Module::plugin(id, plugin, resource));
                if in_queue.insert(plugin) {
                    queue.push_back(plugin);
                }
                continue;
            }

            let path = module_path(&self.root, &name, &self.extension)?;
            let text = match read_text(self.runtime.as_ref(), &path).await {
                Ok(text) => text,
                Err(RuntimeError::FileNotFound(_)) => {
                    let needed_by = store
                        .needed_by_chain(id)
                        .map(|chain| chain.needed_by().to_vec())
                        .unwrap_or_default();
                    return Err(ConfigurationError::MissingSource {
                        id: name,
                        path,
                        needed_by,
                    }
                    .into());
                }
                Err(source) => return Err(Error::ReadFile { path, source }),
            };

            let mut dependencies = Vec::new();
            for spec in scan_dependencies(&text, &path) {
                let dep = resolve(store.ids_mut(), Some(&name), &spec)?;
                if !dependencies.contains(&dep) {
                    dependencies.push(dep);
                }
            }

            for dep in &dependencies {
                let target = dep.target();
                if in_queue.insert(target) {
                    queue.push_back(target);
                }
            }

            tracing::debug!(
                module = %name,
                dependencies = dependencies.len(),
                "discovered module"
            );
            store.insert(Module::source(id, path, text, dependencies));
        }

        Ok(())
    }
}
