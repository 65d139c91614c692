//! Platform runtime abstraction.
//!
//! All file I/O performed by discovery, emission and the tree-shaker goes
//! through the [`Runtime`] trait, so tests and embedders can supply their own
//! filesystem.

#[cfg(not(target_family = "wasm"))]
pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Module and config lookups treat this as "absent", not as a failure.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Runtime error: {0}")]
    Other(String),
}

/// Filesystem seen by discovery, emission and the tree-shaker.
///
/// [`native::NativeRuntime`] reads the local disk; `test_utils::TestRuntime`
/// keeps a whole source tree in memory.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Create or replace `path`. The parent directory must exist.
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    fn exists(&self, path: &Path) -> bool;

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    async fn remove_file(&self, path: &Path) -> RuntimeResult<()>;

    /// Move `from` to `to`, replacing `to` if it exists.
    async fn rename(&self, from: &Path, to: &Path) -> RuntimeResult<()>;
}

/// Read a UTF-8 text file, dropping a leading byte order mark.
pub async fn read_text(runtime: &dyn Runtime, path: &Path) -> RuntimeResult<String> {
    let bytes = runtime.read_file(path).await?;
    let text = String::from_utf8(bytes)
        .map_err(|_| RuntimeError::Io(format!("{} is not valid UTF-8", path.display())))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
