//! Shared test utilities for amdpack-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use amdpack_bundler::{BuildConfig, BuildOutput, Bundler, EntryPointSpec, Runtime};
use amdpack_graph::test_utils::TestRuntime;

/// In-memory source tree rooted at `/src`.
pub fn source_tree(files: &[(&str, &str)]) -> Arc<TestRuntime> {
    let runtime = files
        .iter()
        .fold(TestRuntime::new("/src"), |rt, (path, text)| rt.with_file(path, text));
    Arc::new(runtime)
}

/// Write a source tree to disk under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, text) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, text).unwrap();
    }
}

/// Config reading from `/src` and writing to `/out`.
pub fn config(entry_points: Vec<EntryPointSpec>) -> BuildConfig {
    BuildConfig {
        source_root: "/src".into(),
        out_dir: "/out".into(),
        entry_points,
        ..BuildConfig::default()
    }
}

/// Bundler over an in-memory tree.
pub fn bundler(config: BuildConfig, runtime: Arc<TestRuntime>) -> Bundler {
    Bundler::new(config).with_runtime(runtime as Arc<dyn Runtime>)
}

/// Module ids of the bundle for `entry`.
pub fn modules<'a>(output: &'a BuildOutput, entry: &str) -> Vec<&'a str> {
    output
        .entry(entry)
        .unwrap_or_else(|| panic!("no bundle for '{entry}'"))
        .modules
        .iter()
        .map(String::as_str)
        .collect()
}

/// Full text of the bundle for `entry`.
pub fn bundle_text(output: &BuildOutput, entry: &str) -> String {
    output
        .entry(entry)
        .unwrap_or_else(|| panic!("no bundle for '{entry}'"))
        .bundle
        .contents()
}
