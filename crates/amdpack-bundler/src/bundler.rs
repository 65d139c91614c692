//! The build pipeline: shake, discover, sort, emit, write.

use std::path::Path;
use std::sync::Arc;

use amdpack_config::{BuildConfig, validate_schema};
use amdpack_graph::runtime::native::NativeRuntime;
use amdpack_graph::{BuildSession, Discoverer, Runtime, topological_sort};
use amdpack_shaker::{ShakeAmbiguity, ShakeOptions};

use crate::emit::{EmittedEntry, Emitter};
use crate::output::{BundleData, BundleFile, write_bundle_files, write_report};
use crate::plugins::{LoaderPlugin, PluginContext, PluginRegistry};
use crate::Result;

/// Result of a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    /// Per-entry output, in entry point order.
    pub entries: Vec<EmittedEntry>,
    /// Files written by `finish_build` plugin hooks.
    pub plugin_files: Vec<BundleFile>,
    /// Global module order all bundles were sliced from.
    pub order: Vec<String>,
    pub report: BundleData,
    /// Soft findings of the tree-shaking stage, if it ran.
    pub shake_warnings: Vec<ShakeAmbiguity>,
}

impl BuildOutput {
    /// Every output file: each bundle followed by its plugin files, then the
    /// build-wide plugin files.
    pub fn files(&self) -> impl Iterator<Item = &BundleFile> {
        self.entries
            .iter()
            .flat_map(EmittedEntry::files)
            .chain(&self.plugin_files)
    }

    pub fn entry(&self, name: &str) -> Option<&EmittedEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Runs builds described by a [`BuildConfig`].
#[derive(Debug, Clone)]
pub struct Bundler {
    config: BuildConfig,
    runtime: Arc<dyn Runtime>,
    plugins: PluginRegistry,
}

impl Bundler {
    /// Create a bundler reading from the native filesystem.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            runtime: Arc::new(NativeRuntime::new()),
            plugins: PluginRegistry::new(),
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Register a loader plugin under its module id.
    pub fn with_plugin(mut self, id: impl Into<String>, plugin: Arc<dyn LoaderPlugin>) -> Self {
        self.plugins.register(id, plugin);
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Build every bundle in memory without writing anything but the shaken
    /// source tree.
    pub async fn build(&self) -> Result<BuildOutput> {
        self.run(None).await
    }

    /// Build and write all bundles to the configured output directory.
    ///
    /// Each entry point's files are written as soon as its bundle is
    /// complete, so a failure in a later bundle leaves the earlier ones on
    /// disk.
    pub async fn write(&self) -> Result<BuildOutput> {
        let out_dir = self.config.out_dir.as_path();
        let output = self.run(Some(out_dir)).await?;

        let runtime = self.runtime.as_ref();
        write_bundle_files(runtime, &output.plugin_files, out_dir, true).await?;
        if self.config.write_bundle_info {
            write_report(runtime, &output.report, out_dir).await?;
        }
        Ok(output)
    }

    /// Run one build. With `out_dir`, each finished entry is written there
    /// before the next starts.
    async fn run(&self, out_dir: Option<&Path>) -> Result<BuildOutput> {
        let config = &self.config;
        validate_schema(config)?;

        let shake_warnings = self.shake().await?;

        let mut session = BuildSession::new();
        let discoverer = Discoverer::new(config.module_root(), self.runtime.clone())
            .with_extension(config.extension.as_str());
        discoverer
            .discover_into(&mut session.store, &self.mentioned_ids())
            .await?;

        let order = topological_sort(&session.store)?;
        tracing::debug!(modules = order.len(), "computed global module order");

        let mut output = BuildOutput {
            order: order
                .iter()
                .map(|id| session.store.name(*id).to_string())
                .collect(),
            report: BundleData::from_store(&session.store),
            shake_warnings,
            ..BuildOutput::default()
        };

        let context = PluginContext::new(config.source_root.clone(), self.runtime.clone());
        let mut emitter =
            Emitter::new(&mut session, &self.plugins, context).with_header(config.header.clone());

        for spec in &config.entry_points {
            let entry = emitter.emit_entry(spec, &order).await?;
            if let Some(dir) = out_dir {
                let files: Vec<BundleFile> = entry.files().cloned().collect();
                write_bundle_files(self.runtime.as_ref(), &files, dir, true).await?;
            }
            output
                .report
                .record_bundle(entry.name.clone(), entry.modules.clone());
            output.entries.push(entry);
        }
        output.plugin_files = emitter.finish_build().await?;

        tracing::info!(
            bundles = output.entries.len(),
            plugin_files = output.plugin_files.len(),
            "build finished"
        );
        Ok(output)
    }

    /// Run the tree-shaking stage if configured, writing the shaken tree.
    async fn shake(&self) -> Result<Vec<ShakeAmbiguity>> {
        let Some(shake) = &self.config.shake else {
            return Ok(Vec::new());
        };

        let options = ShakeOptions::from_config(&self.config.source_root, shake)?
            .with_extension(self.config.extension.as_str());
        let shaken = amdpack_shaker::shake(&options, self.runtime.clone()).await?;
        shaken
            .write_to(self.runtime.as_ref(), &self.config.shaken_dir())
            .await?;
        Ok(shaken.warnings)
    }

    /// Every id named by an entry point: names, includes and excludes.
    fn mentioned_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for spec in &self.config.entry_points {
            for id in spec.roots().chain(spec.exclude.iter().map(String::as_str)) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}
