//! File writing for bundle output.
//!
//! Every destination is validated against the output directory, then all
//! files of one batch are written to temporary files and renamed into place.
//! A failure removes the temporary files of that batch. All I/O goes through
//! the build's [`Runtime`].

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use amdpack_graph::Runtime;

use super::bundle::{BundleFile, SourceFragment};
use super::report::{BUNDLE_INFO_FILE, BundleData};
use crate::{Error, Result};

/// Writes bundle files under `dir`.
///
/// # Errors
///
/// - [`Error::InvalidOutputPath`] if a destination escapes `dir`
/// - [`Error::OutputExists`] if a file exists and `overwrite` is `false`
/// - [`Error::WriteFailure`] for any I/O failure
///
/// # Examples
///
/// ```no_run
/// use amdpack_bundler::output::{BundleFile, SourceFragment, write_bundle_files};
/// use amdpack_graph::runtime::native::NativeRuntime;
/// use std::path::Path;
///
/// # async fn example() -> amdpack_bundler::Result<()> {
/// let mut file = BundleFile::new("app.js");
/// file.push(SourceFragment::synthetic("define(\"app\", [], {});"));
/// write_bundle_files(&NativeRuntime, &[file], Path::new("out"), true).await?;
/// # Ok(())
/// # }
/// ```
pub async fn write_bundle_files(
    runtime: &dyn Runtime,
    files: &[BundleFile],
    dir: &Path,
    overwrite: bool,
) -> Result<()> {
    let dir = absolute_dir(dir)?;
    runtime.create_dir(&dir, true).await.map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let target = output_path(&dir, &file.dest)?;
        if !overwrite && runtime.exists(&target) {
            return Err(Error::OutputExists(format!(
                "File already exists: '{}'. Use overwrite=true to replace.",
                target.display()
            )));
        }
        staged.push((target, file.contents().into_bytes()));
    }

    let count = staged.len();
    write_staged(runtime, staged).await?;
    tracing::debug!(count, dir = %dir.display(), "wrote bundle files");
    Ok(())
}

/// Writes `bundleInfo.json` under `dir`, replacing any previous report.
pub async fn write_report(runtime: &dyn Runtime, report: &BundleData, dir: &Path) -> Result<()> {
    let json = report
        .to_json()
        .map_err(|e| Error::WriteFailure(format!("Failed to serialize bundle report: {e}")))?;
    let mut file = BundleFile::new(BUNDLE_INFO_FILE);
    file.push(SourceFragment::synthetic(json));
    write_bundle_files(runtime, &[file], dir, true).await
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {e}")))?;
    Ok(cwd.join(&cleaned).clean())
}

/// Joins `dest` onto `base_dir`, rejecting anything that lands outside it.
fn output_path(base_dir: &Path, dest: &Path) -> Result<PathBuf> {
    if dest.as_os_str().is_empty() {
        return Err(Error::InvalidOutputPath("Empty destination".to_string()));
    }
    if dest.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full = base_dir.join(dest.clean()).clean();
    if full == base_dir || !full.starts_with(base_dir) {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            dest.display(),
            base_dir.display(),
            full.display()
        )));
    }
    Ok(full)
}

/// `app.js` -> `app.js.tmp`, so `app.js` and `app.css` never share a temp file.
fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Two-phase write: every file to `*.tmp` first, then rename into place.
async fn write_staged(runtime: &dyn Runtime, staged: Vec<(PathBuf, Vec<u8>)>) -> Result<()> {
    let mut temps: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(staged.len());

    for (target, content) in staged {
        let tmp = temp_path(&target);
        let written = match target.parent() {
            Some(parent) => runtime.create_dir(parent, true).await,
            None => Ok(()),
        };
        let written = match written {
            Ok(()) => runtime.write_file(&tmp, &content).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            discard(runtime, &temps).await;
            return Err(Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {e}",
                tmp.display()
            )));
        }
        temps.push((tmp, target));
    }

    for (tmp, target) in &temps {
        if let Err(e) = runtime.rename(tmp, target).await {
            discard(runtime, &temps).await;
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {e}",
                tmp.display(),
                target.display()
            )));
        }
    }
    Ok(())
}

async fn discard(runtime: &dyn Runtime, temps: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in temps {
        if !runtime.exists(tmp) {
            continue;
        }
        if let Err(e) = runtime.remove_file(tmp).await {
            tracing::warn!(path = %tmp.display(), error = %e, "failed to clean up temporary file");
        }
    }
}
