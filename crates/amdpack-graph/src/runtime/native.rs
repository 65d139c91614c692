//! Runtime backed by the local filesystem.
//!
//! Every call runs `std::fs` on tokio's blocking pool.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::task;

use super::{Runtime, RuntimeError, RuntimeResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(action: &str, path: &Path, err: io::Error) -> RuntimeError {
    RuntimeError::Io(format!("failed to {action} {}: {err}", path.display()))
}

/// Run `op` on the blocking pool.
async fn blocking<T, F>(op: F) -> RuntimeResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RuntimeResult<T> + Send + 'static,
{
    task::spawn_blocking(op)
        .await
        .map_err(|e| RuntimeError::Other(format!("blocking task failed: {e}")))?
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();
        blocking(move || {
            std::fs::read(&path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RuntimeError::FileNotFound(path.clone()),
                _ => io_error("read", &path, e),
            })
        })
        .await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        let content = content.to_vec();
        blocking(move || std::fs::write(&path, content).map_err(|e| io_error("write", &path, e))).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        blocking(move || {
            let created = if recursive {
                std::fs::create_dir_all(&path)
            } else {
                std::fs::create_dir(&path)
            };
            created.map_err(|e| io_error("create directory", &path, e))
        })
        .await
    }

    async fn remove_file(&self, path: &Path) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        blocking(move || std::fs::remove_file(&path).map_err(|e| io_error("remove", &path, e))).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> RuntimeResult<()> {
        let (from, to) = (from.to_path_buf(), to.to_path_buf());
        blocking(move || std::fs::rename(&from, &to).map_err(|e| io_error("rename", &from, e))).await
    }
}
