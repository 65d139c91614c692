//! Built-in `css!` loader plugin.
//!
//! Stylesheets referenced as `css!path/to/file` are not inlined into the
//! JavaScript bundle. Each reference becomes an empty module so the AMD
//! loader sees it as resolved, and the stylesheet text is collected into
//! `<bundle stem>.css` next to the bundle that used it.
//!
//! Relative resources are resolved against the importing module before they
//! get here, so `css!./foo` in `ui/app` arrives as `ui/foo`:
//!
//! ```text
//! css!ui/foo  ──write()──▶ define("css!ui/foo", {});        (in app.js)
//!             └──────────▶ ui/foo.css text ──write_file()──▶ app.css
//!                                          └─finish_build()─▶ css.manifest.json
//! ```
//!
//! Collected stylesheets live in the build's [`PluginContext`], so repeated
//! builds with one plugin value start from nothing.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use amdpack_bundler::{BuildConfig, Bundler, CssPlugin};
//!
//! let bundler = Bundler::new(BuildConfig::default()).with_plugin("vs/css", Arc::new(CssPlugin::new()));
//! ```

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use indexmap::IndexMap;
use path_clean::PathClean;

use amdpack_config::EntryPointSpec;

use crate::plugins::{FileWriter, LoaderPlugin, ModuleWriter, PluginContext, PluginHooks};

/// File name of the build-wide list of inlined stylesheets.
pub const CSS_MANIFEST_FILE: &str = "css.manifest.json";

#[derive(Debug, Default)]
pub struct CssPlugin;

/// Entry point name to (resource, stylesheet) pairs, in bundle order.
#[derive(Debug, Default)]
struct CollectedSheets(IndexMap<String, Vec<(String, String)>>);

impl CssPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the stylesheet for `resource`, relative to the source root.
    fn stylesheet_path(resource: &str) -> PathBuf {
        let file = if resource.ends_with(".css") {
            resource.to_string()
        } else {
            format!("{resource}.css")
        };
        PathBuf::from(file).clean()
    }
}

#[async_trait]
impl LoaderPlugin for CssPlugin {
    fn hooks(&self) -> PluginHooks {
        PluginHooks {
            write_file: true,
            finish_build: true,
        }
    }

    async fn write(
        &self,
        ctx: &PluginContext,
        plugin_name: &str,
        resource: &str,
        out: &mut ModuleWriter<'_>,
    ) -> anyhow::Result<()> {
        let path = Self::stylesheet_path(resource);
        let stylesheet = ctx
            .read_text(&path)
            .await
            .with_context(|| format!("reading stylesheet for '{plugin_name}!{resource}'"))?;

        let entry = out.entry_point().to_string();
        ctx.with_state(|sheets: &mut CollectedSheets| {
            sheets
                .0
                .entry(entry)
                .or_default()
                .push((resource.to_string(), stylesheet));
        });

        out.as_module(&format!("{plugin_name}!{resource}"), "define({});");
        Ok(())
    }

    async fn write_file(
        &self,
        ctx: &PluginContext,
        _plugin_name: &str,
        entry_point: &EntryPointSpec,
        out: &mut FileWriter,
    ) -> anyhow::Result<()> {
        let sheets = ctx.with_state(|sheets: &mut CollectedSheets| {
            sheets.0.get(&entry_point.name).cloned().unwrap_or_default()
        });
        if sheets.is_empty() {
            return Ok(());
        }

        let mut contents = String::new();
        for (resource, stylesheet) in sheets {
            contents.push_str(&format!("/* {resource} */\n"));
            contents.push_str(stylesheet.trim_end());
            contents.push('\n');
        }
        out.write(entry_point.dest_path().with_extension("css"), contents);
        Ok(())
    }

    async fn finish_build(&self, ctx: &PluginContext, out: &mut FileWriter) -> anyhow::Result<()> {
        let mut resources: Vec<String> = ctx.with_state(|sheets: &mut CollectedSheets| {
            sheets
                .0
                .values()
                .flatten()
                .map(|(resource, _)| resource.clone())
                .collect()
        });
        resources.sort();
        resources.dedup();

        let manifest =
            serde_json::to_string_pretty(&resources).context("serializing css manifest")?;
        out.write(CSS_MANIFEST_FILE, manifest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_path_appends_extension() {
        assert_eq!(CssPlugin::stylesheet_path("ui/foo"), PathBuf::from("ui/foo.css"));
        assert_eq!(
            CssPlugin::stylesheet_path("vs/base/browser/ui/button.css"),
            PathBuf::from("vs/base/browser/ui/button.css")
        );
    }
}
