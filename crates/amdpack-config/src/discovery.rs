//! File-based config discovery.
//!
//! Finds `amdpack.toml` or `amdpack.json` and loads it on top of the
//! defaults, with `AMDPACK_*` environment variables applied last.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml};

use crate::config::BuildConfig;
use crate::error::{ConfigError, Result};

/// File names searched for, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["amdpack.toml", "amdpack.json"];

/// Prefix of environment variable overrides. Nested keys are separated by a
/// double underscore, e.g. `AMDPACK_SHAKE__LEVEL=files`.
pub const ENV_PREFIX: &str = "AMDPACK_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use amdpack_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    pub fn find(&self) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.exists())
    }

    /// Load config from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<BuildConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    /// Load config from a specific file path.
    ///
    /// Relative `source_root` and `out_dir` values are resolved against the
    /// directory holding the file.
    pub fn load_from(&self, path: &Path) -> Result<BuildConfig> {
        if !path.exists() {
            return Err(ConfigError::NotFound);
        }
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => layered(Toml::file(path)),
            Some("json") => layered(Json::file(path)),
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };

        tracing::debug!(path = %path.display(), "loading configuration");
        let mut config: BuildConfig = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(e.to_string()),
        })?;

        let base = path.parent().unwrap_or(&self.root);
        config.source_root = base.join(&config.source_root);
        config.out_dir = base.join(&config.out_dir);
        if let Some(shake_out) = config.shake.as_mut().and_then(|s| s.out_dir.as_mut()) {
            *shake_out = base.join(&*shake_out);
        }
        Ok(config)
    }
}

/// Defaults, then `provider`, then environment overrides.
fn layered(provider: impl figment::Provider) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BuildConfig::default()))
        .merge(provider)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Discover and load config from current directory (convenience function)
///
/// # Example
///
/// ```no_run
/// use amdpack_config::discover;
///
/// let config = discover().unwrap();
/// ```
pub fn discover() -> Result<BuildConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}
