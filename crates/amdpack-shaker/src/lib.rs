//! # amdpack-shaker
//!
//! Mark-and-sweep dead code elimination over a tree of TypeScript sources.
//!
//! ```text
//! entry points ──▶ mark (White → Gray → Black) ──▶ sweep ──▶ ShakeOutput
//!                     │                                        │
//!                     ▼                                        ▼
//!           per-file facts (oxc)                        write_to(out_dir)
//! ```
//!
//! Every top-level statement, import or export specifier and class member
//! is a node. Nodes start White; whatever the entry points reach turns
//! Black and is printed back verbatim. Gray nodes are kept partially: an
//! import list with unused names, or (at [`ShakeLevel::ClassMembers`]) a
//! class whose members are kept only if some kept code reads a property of
//! that name.
//!
//! The three levels:
//!
//! - [`ShakeLevel::Files`]: drop whole files nothing imports.
//! - [`ShakeLevel::InnerFile`]: also drop unused top-level declarations.
//! - [`ShakeLevel::ClassMembers`]: also drop unused class members.
//!
//! Shaking is idempotent: shaking the output again changes nothing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use amdpack_shaker::{ShakeLevel, ShakeOptions};
//! use amdpack_graph::runtime::native::NativeRuntime;
//!
//! # #[tokio::main]
//! # async fn main() -> amdpack_shaker::Result<()> {
//! let runtime = Arc::new(NativeRuntime::new());
//! let options = ShakeOptions::new("src", ["vs/editor/editor.main"])
//!     .with_level(ShakeLevel::ClassMembers);
//!
//! let output = amdpack_shaker::shake(&options, runtime.clone()).await?;
//! for warning in &output.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! output.write_to(runtime.as_ref(), "out-shaken".as_ref()).await?;
//! # Ok(())
//! # }
//! ```

mod color;
mod error;
mod facts;
mod mark;
mod options;
mod output;
mod sweep;

use std::sync::Arc;

use amdpack_graph::Runtime;

pub use amdpack_config::ShakeLevel;
pub use color::{ColorMap, NodeColor, NodeId};
pub use error::{Result, ShakeAmbiguity, ShakeError};
pub use options::{INLINE_ENTRY_PREFIX, ShakeOptions};
pub use output::{ShakeOutput, ShakenFile};
pub use sweep::DUMMY_EXPORT;

use mark::Marker;

/// Shake the tree under `options.source_root` down to what the entry points
/// reach.
///
/// # Errors
///
/// Fails if an entry point has no file, or if a file that has to be
/// inspected cannot be read or parsed. Anything merely ambiguous is
/// reported in [`ShakeOutput::warnings`] instead.
pub async fn shake(options: &ShakeOptions, runtime: Arc<dyn Runtime>) -> Result<ShakeOutput> {
    tracing::debug!(
        root = %options.source_root.display(),
        level = ?options.level,
        entries = options.entry_points.len(),
        inline = options.inline_entry_points.len(),
        "shaking"
    );

    let mut marker = Marker::new(options, runtime);
    marker.run().await?;

    let mut files = Vec::new();
    for file in marker.files.iter().filter(|f| f.needed && !f.synthetic) {
        let mut contents = sweep::render(file, &marker.colors, marker.level());
        if contents.trim().is_empty() && !file.root {
            contents = DUMMY_EXPORT.to_string();
        }
        files.push(ShakenFile {
            module: file.key.clone(),
            path: file.relative.clone(),
            contents,
        });
    }
    files.sort_by(|a, b| a.module.cmp(&b.module));

    let discarded = marker.discarded().await?;

    let mut warnings = std::mem::take(&mut marker.ambiguities);
    warnings.sort();
    warnings.dedup();
    for warning in &warnings {
        tracing::warn!(module = warning.module(), "{warning}");
    }

    tracing::info!(
        kept = files.len(),
        discarded = discarded.len(),
        warnings = warnings.len(),
        "tree shaking finished"
    );
    Ok(ShakeOutput {
        files,
        discarded,
        warnings,
    })
}
