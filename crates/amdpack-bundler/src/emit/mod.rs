//! Bundle emission.
//!
//! Turns a discovered, ordered [`BuildSession`] into one [`BundleFile`] per
//! entry point, plus whatever files loader plugins add.

mod boilerplate;
mod members;
mod rewrite;

pub use boilerplate::dedupe_helpers;
pub use members::bundle_members;
pub use rewrite::rewrite_define;

use std::path::PathBuf;

use amdpack_config::{EntryPointSpec, ExtraFile, duplicate_name};
use amdpack_graph::{BuildSession, ConfigurationError, ModuleId, ModuleKind};

use crate::output::{BundleFile, SourceFragment};
use crate::plugins::{FileWriter, ModuleWriter, PluginContext, PluginRegistry};
use crate::{Error, Result};

/// Everything produced for one entry point.
#[derive(Debug, Clone)]
pub struct EmittedEntry {
    pub name: String,
    /// The bundle itself.
    pub bundle: BundleFile,
    /// Files added by `write_file` plugin hooks.
    pub extra_files: Vec<BundleFile>,
    /// Module ids in the bundle, in order.
    pub modules: Vec<String>,
}

impl EmittedEntry {
    /// The bundle followed by the plugin files.
    pub fn files(&self) -> impl Iterator<Item = &BundleFile> {
        std::iter::once(&self.bundle).chain(&self.extra_files)
    }
}

/// Emits bundles for one build session.
pub struct Emitter<'a> {
    session: &'a mut BuildSession,
    plugins: &'a PluginRegistry,
    context: PluginContext,
    header: Option<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(
        session: &'a mut BuildSession,
        plugins: &'a PluginRegistry,
        context: PluginContext,
    ) -> Self {
        Self {
            session,
            plugins,
            context,
            header: None,
        }
    }

    /// Text placed at the top of every bundle.
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    /// Emit every entry point, then run `finish_build` for the used plugins.
    ///
    /// Returns the per-entry output and the build-wide plugin files.
    pub async fn emit_all(
        &mut self,
        specs: &[EntryPointSpec],
        order: &[ModuleId],
    ) -> Result<(Vec<EmittedEntry>, Vec<BundleFile>)> {
        if let Some(name) = duplicate_name(specs) {
            return Err(ConfigurationError::DuplicateEntryPoint(name.to_string()).into());
        }
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            entries.push(self.emit_entry(spec, order).await?);
        }
        let finished = self.finish_build().await?;
        Ok((entries, finished))
    }

    /// Emit the bundle for `spec`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingDefine`] for a source module without
    ///   a `define(` call
    /// - [`Error::UnknownPlugin`] / [`Error::Plugin`] for plugin failures
    pub async fn emit_entry(
        &mut self,
        spec: &EntryPointSpec,
        order: &[ModuleId],
    ) -> Result<EmittedEntry> {
        let members = bundle_members(&mut self.session.store, spec, order)?;
        let mut bundle = BundleFile::new(spec.dest_path());

        if let Some(header) = &self.header {
            bundle.push(SourceFragment::synthetic(header.clone()));
        }
        for file in &spec.prepend {
            bundle.push(self.extra_file(file).await?);
        }

        let mut plugins_in_bundle: Vec<ModuleId> = Vec::new();
        for &id in &members {
            let fragments = self.module_fragments(&spec.name, id).await?;
            if let Some(plugin) = self.plugin_of(id) {
                self.session.record_plugin_use(plugin);
                if !plugins_in_bundle.contains(&plugin) {
                    plugins_in_bundle.push(plugin);
                }
            }
            bundle.sources.extend(fragments);
        }

        for file in &spec.append {
            bundle.push(self.extra_file(file).await?);
        }
        dedupe_helpers(&mut bundle);

        let mut extra = FileWriter::new();
        for plugin_id in plugins_in_bundle {
            let plugin_name = self.session.store.name(plugin_id).to_string();
            let Some(plugin) = self.plugins.get(&plugin_name) else {
                continue;
            };
            if plugin.hooks().write_file {
                plugin
                    .write_file(&self.context, &plugin_name, spec, &mut extra)
                    .await
                    .map_err(|e| Error::plugin(&plugin_name, e))?;
            }
        }

        let modules: Vec<String> = members
            .iter()
            .map(|id| self.session.store.name(*id).to_string())
            .collect();
        tracing::info!(
            entry = %spec.name,
            dest = %bundle.dest.display(),
            modules = modules.len(),
            "emitted bundle"
        );

        Ok(EmittedEntry {
            name: spec.name.clone(),
            bundle,
            extra_files: extra.into_files(),
            modules,
        })
    }

    /// Run `finish_build` once for every plugin used so far, in order of
    /// first use.
    pub async fn finish_build(&mut self) -> Result<Vec<BundleFile>> {
        let mut out = FileWriter::new();
        for &plugin_id in self.session.used_plugins() {
            let plugin_name = self.session.store.name(plugin_id);
            let Some(plugin) = self.plugins.get(plugin_name) else {
                continue;
            };
            if plugin.hooks().finish_build {
                plugin
                    .finish_build(&self.context, &mut out)
                    .await
                    .map_err(|e| Error::plugin(plugin_name, e))?;
            }
        }
        Ok(out.into_files())
    }

    fn plugin_of(&self, id: ModuleId) -> Option<ModuleId> {
        match &self.session.store.get(id)?.kind {
            ModuleKind::Plugin { plugin, .. } => Some(*plugin),
            ModuleKind::Source { .. } => None,
        }
    }

    async fn module_fragments(&self, entry: &str, id: ModuleId) -> Result<Vec<SourceFragment>> {
        let store = &self.session.store;
        let name = store.name(id);
        let Some(module) = store.get(id) else {
            return Err(ConfigurationError::MissingSource {
                id: name.to_string(),
                path: PathBuf::from(name),
                needed_by: store
                    .needed_by_chain(id)
                    .map(|chain| chain.needed_by().to_vec())
                    .unwrap_or_default(),
            }
            .into());
        };

        match &module.kind {
            ModuleKind::Source { path, text } => {
                let contents =
                    rewrite_define(text, name).ok_or_else(|| ConfigurationError::MissingDefine {
                        id: name.to_string(),
                        path: path.clone(),
                    })?;
                Ok(vec![SourceFragment::from_file(path.clone(), contents)])
            }
            ModuleKind::Plugin { plugin, resource } => {
                let plugin_name = store.name(*plugin);
                let loader = self.plugins.get(plugin_name).ok_or_else(|| Error::UnknownPlugin {
                    plugin: plugin_name.to_string(),
                    id: name.to_string(),
                })?;
                let mut out = ModuleWriter::new(entry);
                loader
                    .write(&self.context, plugin_name, resource, &mut out)
                    .await
                    .map_err(|e| Error::plugin(plugin_name, e))?;
                Ok(out.into_fragments())
            }
        }
    }

    async fn extra_file(&self, file: &ExtraFile) -> Result<SourceFragment> {
        let path = self.context.source_root().join(&file.path);
        let text = amdpack_graph::runtime::read_text(self.context.runtime().as_ref(), &path)
            .await
            .map_err(|source| amdpack_graph::Error::ReadFile {
                path: path.clone(),
                source,
            })?;

        let contents = match &file.amd_module_id {
            Some(id) => rewrite_define(&text, id).ok_or_else(|| ConfigurationError::MissingDefine {
                id: id.clone(),
                path: path.clone(),
            })?,
            None => text,
        };
        Ok(SourceFragment::from_file(path, contents))
    }
}
