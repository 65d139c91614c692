use std::path::{Path, PathBuf};

use amdpack_graph::Runtime;

use crate::error::{Result, ShakeAmbiguity, ShakeError};

/// One file of the shaken tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShakenFile {
    /// Module key, e.g. `vs/base/common/event`.
    pub module: String,
    /// Path relative to the source root.
    pub path: PathBuf,
    pub contents: String,
}

/// Result of a shaking pass.
#[derive(Debug, Clone, Default)]
pub struct ShakeOutput {
    /// Surviving files, sorted by module key.
    pub files: Vec<ShakenFile>,
    /// Modules reachable through imports that were removed entirely.
    pub discarded: Vec<String>,
    /// Sorted and deduplicated.
    pub warnings: Vec<ShakeAmbiguity>,
}

impl ShakeOutput {
    pub fn get(&self, module: &str) -> Option<&ShakenFile> {
        self.files
            .binary_search_by(|f| f.module.as_str().cmp(module))
            .ok()
            .map(|i| &self.files[i])
    }

    /// Shaken text of `module`, if it survived.
    pub fn contents(&self, module: &str) -> Option<&str> {
        self.get(module).map(|f| f.contents.as_str())
    }

    /// Write every surviving file below `out_dir`, mirroring the source tree.
    ///
    /// # Errors
    ///
    /// [`ShakeError::Write`] for the first directory or file that cannot be
    /// written.
    pub async fn write_to(&self, runtime: &dyn Runtime, out_dir: &Path) -> Result<()> {
        for file in &self.files {
            let target = out_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                runtime
                    .create_dir(parent, true)
                    .await
                    .map_err(|source| ShakeError::Write {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
            runtime
                .write_file(&target, file.contents.as_bytes())
                .await
                .map_err(|source| ShakeError::Write {
                    path: target.clone(),
                    source,
                })?;
        }
        tracing::debug!(
            files = self.files.len(),
            out_dir = %out_dir.display(),
            "wrote shaken tree"
        );
        Ok(())
    }
}
