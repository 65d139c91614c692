//! In-memory runtime for tests.
//!
//! `TestRuntime` keeps files in a map instead of touching the disk, so unit
//! tests can describe a whole source tree inline.

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::{Runtime, RuntimeError, RuntimeResult};

/// In-memory filesystem keyed by path.
///
/// # Example
///
/// ```rust,ignore
/// use amdpack_graph::test_utils::TestRuntime;
///
/// let runtime = TestRuntime::new("/src")
///     .with_file("app.ts", "define(['./util'], function () {});")
///     .with_file("util.ts", "define([], function () {});");
/// assert!(runtime.contains("/src/util.ts"));
/// ```
#[derive(Debug, Default)]
pub struct TestRuntime {
    root: PathBuf,
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl TestRuntime {
    /// Create an empty runtime; relative paths given to `with_file` are
    /// placed under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a file relative to the root.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        let full = self.root.join(path);
        self.files.write().insert(full, content.as_ref().to_vec());
        self
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.read().contains_key(path.as_ref())
    }

    /// Contents of a file as text, if present.
    pub fn text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .read()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.files
            .write()
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    async fn create_dir(&self, _path: &Path, _recursive: bool) -> RuntimeResult<()> {
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> RuntimeResult<()> {
        self.files
            .write()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn rename(&self, from: &Path, to: &Path) -> RuntimeResult<()> {
        let mut files = self.files.write();
        let content = files
            .remove(from)
            .ok_or_else(|| RuntimeError::FileNotFound(from.to_path_buf()))?;
        files.insert(to.to_path_buf(), content);
        Ok(())
    }
}
