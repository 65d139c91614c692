//! Build configuration for amdpack.
//!
//! A build is described by a [`BuildConfig`]: where module sources live, the
//! list of [`EntryPointSpec`]s to bundle, and an optional [`ShakeConfig`] for
//! the tree-shaking pass that runs before bundling.
//!
//! Configuration is usually read from `amdpack.toml` or `amdpack.json` with
//! [`ConfigDiscovery`], layered as defaults, then the file, then `AMDPACK_*`
//! environment variables.

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod settings;
pub mod shake;
pub mod validation;

pub use config::*;
pub use entry::*;
pub use error::*;
pub use settings::*;
pub use shake::*;

pub use discovery::{ConfigDiscovery, discover};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
