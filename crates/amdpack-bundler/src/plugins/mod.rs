//! Loader plugins.
//!
//! A module id of the form `plugin!resource` is never read from disk. The
//! emitter hands it to the [`LoaderPlugin`] registered under the plugin's
//! module id, which decides what (if anything) ends up in the bundle.
//!
//! Hooks:
//! - [`write`](LoaderPlugin::write): once per plugin id in a bundle, emits
//!   content inline at the module's position
//! - [`write_file`](LoaderPlugin::write_file): once per bundle that used the
//!   plugin, may emit additional files
//! - [`finish_build`](LoaderPlugin::finish_build): once per build for every
//!   plugin used at least once
//!
//! The two optional hooks only run when [`LoaderPlugin::hooks`] says the
//! plugin has them.

pub mod registry;

pub use registry::PluginRegistry;

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use amdpack_config::EntryPointSpec;
use amdpack_graph::Runtime;

use crate::emit::rewrite_define;
use crate::output::{BundleFile, SourceFragment};

/// Optional hooks a plugin implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginHooks {
    pub write_file: bool,
    pub finish_build: bool,
}

type BuildState = FxHashMap<TypeId, Box<dyn Any + Send>>;

/// What plugins get to see of the build.
///
/// One context is created per build and dropped with it, together with any
/// state plugins stored through [`with_state`](Self::with_state).
#[derive(Clone)]
pub struct PluginContext {
    source_root: PathBuf,
    runtime: Arc<dyn Runtime>,
    state: Arc<Mutex<BuildState>>,
}

impl Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("source_root", &self.source_root)
            .field("runtime", &self.runtime)
            .field("states", &self.state.lock().len())
            .finish()
    }
}

impl PluginContext {
    pub fn new(source_root: impl Into<PathBuf>, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            source_root: source_root.into(),
            runtime,
            state: Arc::default(),
        }
    }

    /// Run `f` on this build's value of `T`, starting from `T::default()`.
    ///
    /// Values are keyed by type, so a plugin keeps its collected data in a
    /// private type.
    pub fn with_state<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default + Send + 'static,
    {
        let mut states = self.state.lock();
        let slot = states
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()) as Box<dyn Any + Send>);
        match slot.downcast_mut::<T>() {
            Some(state) => f(state),
            None => {
                let mut state = T::default();
                let result = f(&mut state);
                *slot = Box::new(state);
                result
            }
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// Read a text file relative to the source root.
    pub async fn read_text(&self, relative: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = self.source_root.join(relative);
        amdpack_graph::runtime::read_text(self.runtime.as_ref(), &path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))
    }
}

/// Receives inline output of [`LoaderPlugin::write`].
#[derive(Debug)]
pub struct ModuleWriter<'a> {
    entry_point: &'a str,
    fragments: Vec<SourceFragment>,
}

impl<'a> ModuleWriter<'a> {
    pub(crate) fn new(entry_point: &'a str) -> Self {
        Self {
            entry_point,
            fragments: Vec::new(),
        }
    }

    /// Name of the entry point whose bundle is being written.
    pub fn entry_point(&self) -> &str {
        self.entry_point
    }

    /// Emit raw contents.
    pub fn write(&mut self, contents: impl Into<String>) {
        self.fragments.push(SourceFragment::synthetic(contents));
    }

    /// Emit contents as module `id`: the first `define(` is rewritten to
    /// carry the id. Contents without `define(` are emitted unchanged.
    pub fn as_module(&mut self, id: &str, contents: &str) {
        let contents = rewrite_define(contents, id).unwrap_or_else(|| contents.to_string());
        self.fragments.push(SourceFragment::synthetic(contents));
    }

    pub(crate) fn into_fragments(self) -> Vec<SourceFragment> {
        self.fragments
    }
}

/// Receives whole files from [`LoaderPlugin::write_file`] and
/// [`LoaderPlugin::finish_build`].
#[derive(Debug, Default)]
pub struct FileWriter {
    files: Vec<BundleFile>,
}

impl FileWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emit a file at `dest`, relative to the output directory.
    pub fn write(&mut self, dest: impl Into<PathBuf>, contents: impl Into<String>) {
        let mut file = BundleFile::new(dest);
        file.push(SourceFragment::synthetic(contents));
        self.files.push(file);
    }

    pub(crate) fn into_files(self) -> Vec<BundleFile> {
        self.files
    }
}

/// A loader plugin: produces bundle content for `plugin!resource` ids.
///
/// One plugin value serves every build of a [`Bundler`](crate::Bundler).
/// Keep anything collected during a build in
/// [`PluginContext::with_state`], not in the plugin itself.
#[async_trait]
pub trait LoaderPlugin: Send + Sync + Debug {
    /// Which optional hooks this plugin implements.
    fn hooks(&self) -> PluginHooks {
        PluginHooks::default()
    }

    /// Emit content for `plugin_name!resource` into the current bundle.
    async fn write(
        &self,
        ctx: &PluginContext,
        plugin_name: &str,
        resource: &str,
        out: &mut ModuleWriter<'_>,
    ) -> anyhow::Result<()>;

    /// Emit extra files for a bundle that used this plugin.
    async fn write_file(
        &self,
        _ctx: &PluginContext,
        _plugin_name: &str,
        _entry_point: &EntryPointSpec,
        _out: &mut FileWriter,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Emit build-wide files once every bundle has been emitted.
    async fn finish_build(&self, _ctx: &PluginContext, _out: &mut FileWriter) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_writer_rewrites_define() {
        let mut out = ModuleWriter::new("app");
        out.as_module("text!./a.txt", "define([], function () { return 'a'; });");
        out.write("// raw");
        let fragments = out.into_fragments();
        assert_eq!(
            fragments[0].contents,
            "define(\"text!./a.txt\", [], function () { return 'a'; });"
        );
        assert_eq!(fragments[1].contents, "// raw");
        assert!(fragments.iter().all(SourceFragment::is_synthetic));
    }

    #[derive(Default)]
    struct Seen(Vec<&'static str>);

    #[test]
    fn state_is_shared_by_clones_but_not_by_new_contexts() {
        let runtime: Arc<dyn Runtime> =
            Arc::new(amdpack_graph::test_utils::TestRuntime::new("/src"));
        let first = PluginContext::new("/src", runtime.clone());
        first.with_state(|seen: &mut Seen| seen.0.push("a"));
        first.clone().with_state(|seen: &mut Seen| seen.0.push("b"));
        assert_eq!(first.with_state(|seen: &mut Seen| seen.0.clone()), ["a", "b"]);

        let second = PluginContext::new("/src", runtime);
        assert!(second.with_state(|seen: &mut Seen| seen.0.is_empty()));
    }

    #[test]
    fn file_writer_collects_files() {
        let mut out = FileWriter::new();
        out.write("a.css", ".a {}");
        let files = out.into_files();
        assert_eq!(files[0].dest, PathBuf::from("a.css"));
        assert_eq!(files[0].contents(), ".a {}");
    }
}
