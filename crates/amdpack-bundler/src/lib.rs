#![cfg_attr(docsrs, feature(doc_cfg))]

//! # amdpack-bundler
//!
//! Static AMD bundler on top of the amdpack graph.
//!
//! For every [`EntryPointSpec`] the bundler takes the transitive closure of
//! the entry (plus its `include` roots), cuts away everything reachable from
//! its `exclude` roots, slices that set out of one global topological order
//! and concatenates the module sources into a single file. Each module's
//! first `define(` is rewritten to carry its id, so the bundle is
//! self-describing. Ids of the form `plugin!resource` are handed to a
//! [`LoaderPlugin`] instead of being read from disk.
//!
//! ```text
//! BuildConfig ─▶ [shake] ─▶ discover ─▶ sort ─▶ Emitter ─▶ BundleFile[] ─▶ writer
//!                                                  │
//!                                                  └─▶ LoaderPlugin hooks
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use amdpack_bundler::{BuildConfig, Bundler, EntryPointSpec};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = BuildConfig::default();
//! config.entry_points = vec![EntryPointSpec::new("vs/editor/editor.main").with_exclude(["vs/css"])];
//!
//! let output = Bundler::new(config).write().await?;
//! for bundle in output.files() {
//!     println!("{}", bundle.dest.display());
//! }
//! # Ok(()) }
//! ```

// Re-export the foundation crates
pub use amdpack_config::{BuildConfig, EntryPointSpec, ExtraFile, ShakeConfig, ShakeLevel};
pub use amdpack_graph::{BuildSession, ConfigurationError, ModuleId, ModuleStore, Runtime};

pub mod builtins;
pub mod bundler;
pub mod emit;
pub mod output;
pub mod plugins;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use builtins::CssPlugin;
pub use bundler::{BuildOutput, Bundler};
pub use emit::{EmittedEntry, Emitter, bundle_members, rewrite_define};
pub use output::{BundleData, BundleFile, SourceFragment};
pub use plugins::{FileWriter, LoaderPlugin, ModuleWriter, PluginContext, PluginHooks, PluginRegistry};

/// Error types for amdpack-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph construction or ordering failed.
    #[error(transparent)]
    Graph(#[from] amdpack_graph::Error),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Config(#[from] amdpack_config::ConfigError),

    /// The tree-shaking stage failed.
    #[error("Tree-shaking failed: {0}")]
    Shake(#[from] amdpack_shaker::ShakeError),

    /// A loader plugin hook failed.
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// A `plugin!resource` id names a plugin that is not registered.
    #[error("No loader plugin registered for '{plugin}' (needed for '{id}')")]
    UnknownPlugin { plugin: String, id: String },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Output file already exists and overwrite is disabled.
    #[error("Output exists: {0}")]
    OutputExists(String),
}

/// Result type alias for amdpack-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        Error::Graph(err.into())
    }
}

impl Error {
    pub(crate) fn plugin(plugin: &str, err: anyhow::Error) -> Self {
        Error::Plugin {
            plugin: plugin.to_string(),
            message: format!("{err:#}"),
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Graph(amdpack_graph::Error::Configuration(_)) => "CONFIGURATION_ERROR",
            Error::Graph(amdpack_graph::Error::CyclicDependency { .. }) => "CYCLIC_DEPENDENCY",
            Error::Graph(amdpack_graph::Error::ReadFile { .. }) => "READ_FAILURE",
            Error::Config(_) => "INVALID_CONFIG",
            Error::Shake(_) => "SHAKE_ERROR",
            Error::Plugin { .. } => "PLUGIN_ERROR",
            Error::UnknownPlugin { .. } => "UNKNOWN_PLUGIN",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::OutputExists(_) => "OUTPUT_EXISTS",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Graph(amdpack_graph::Error::CyclicDependency { remaining }) => {
                Some(Box::new(format!(
                    "Break the import cycle between these modules: {}",
                    remaining.join(", ")
                )))
            }
            Error::Graph(amdpack_graph::Error::Configuration(
                ConfigurationError::MissingSource { id, needed_by, .. },
            )) => Some(Box::new(if needed_by.is_empty() {
                format!("Create the module '{id}' or remove it from the entry points.")
            } else {
                format!(
                    "Create the module '{id}' or remove the import from '{}'.",
                    needed_by.last().map(String::as_str).unwrap_or_default()
                )
            })),
            Error::Graph(amdpack_graph::Error::Configuration(
                ConfigurationError::MissingDefine { id, .. },
            )) => Some(Box::new(format!(
                "Every bundled module must start with a define( call; '{id}' has none."
            ))),
            Error::Config(err) => Some(Box::new(format!(
                "Check your amdpack.toml for errors.\nError: {err}"
            ))),
            Error::UnknownPlugin { plugin, .. } => Some(Box::new(format!(
                "Register a loader plugin for '{plugin}' with Bundler::with_plugin."
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Ensure it's within the output directory and doesn't contain '..' components."
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {msg}"
            ))),
            Error::OutputExists(msg) => Some(Box::new(format!(
                "Output file already exists: {msg}\nEnable overwrite to replace existing files."
            ))),
            _ => None,
        }
    }
}
