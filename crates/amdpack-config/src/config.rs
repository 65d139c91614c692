//! Top-level build configuration.
//!
//! For file discovery and layered loading, see the `discovery` module.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::*;
use crate::entry::EntryPointSpec;
use crate::error::{ConfigError, Result as ConfigResult};
use crate::settings::GlobalSettings;
use crate::shake::ShakeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding one `<id>.<extension>` file per module id.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Directory bundles are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_extension")]
    pub extension: String,

    /// License or copyright text placed at the top of every bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Write `bundleInfo.json` next to the bundles.
    #[serde(default = "default_write_bundle_info")]
    pub write_bundle_info: bool,

    #[serde(default)]
    pub entry_points: Vec<EntryPointSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shake: Option<ShakeConfig>,

    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            out_dir: default_out_dir(),
            extension: default_extension(),
            header: None,
            write_bundle_info: default_write_bundle_info(),
            entry_points: Vec::new(),
            shake: None,
            settings: GlobalSettings::default(),
        }
    }
}

impl BuildConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use amdpack_config::BuildConfig;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "source_root": "src",
    ///     "entry_points": [{ "name": "vs/editor/editor.main", "exclude": ["vs/css"] }]
    /// });
    ///
    /// let config = BuildConfig::from_value(value).unwrap();
    /// assert_eq!(config.entry_points[0].exclude, ["vs/css"]);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("Invalid TOML syntax: {e}")),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Directory the shaken source tree is written to.
    pub fn shaken_dir(&self) -> PathBuf {
        self.shake
            .as_ref()
            .and_then(|shake| shake.out_dir.clone())
            .unwrap_or_else(|| self.out_dir.join("shaken"))
    }

    /// Directory discovery reads modules from: the shaken tree when shaking
    /// is configured, the source root otherwise.
    pub fn module_root(&self) -> PathBuf {
        if self.shake.is_some() {
            self.shaken_dir()
        } else {
            self.source_root.clone()
        }
    }

    pub fn entry_point(&self, name: &str) -> Option<&EntryPointSpec> {
        self.entry_points.iter().find(|spec| spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shake::ShakeLevel;
    use serde_json::json;

    #[test]
    fn from_value_fills_defaults() {
        let config = BuildConfig::from_value(json!({ "entry_points": [{ "name": "app" }] })).unwrap();
        assert_eq!(config.source_root, PathBuf::from("src"));
        assert_eq!(config.extension, "ts");
        assert!(config.write_bundle_info);
        assert!(config.entry_point("app").is_some());
    }

    #[test]
    fn from_toml_parses_shake_section() {
        let config = BuildConfig::from_toml_str(
            r#"
out_dir = "build"

[[entry_points]]
name = "app"

[shake]
level = "files"
entry_points = ["app"]
"#,
        )
        .unwrap();

        let shake = config.shake.as_ref().unwrap();
        assert_eq!(shake.level, ShakeLevel::Files);
        assert_eq!(config.shaken_dir(), PathBuf::from("build/shaken"));
        assert_eq!(config.module_root(), PathBuf::from("build/shaken"));
    }

    #[test]
    fn module_root_is_source_root_without_shake() {
        assert_eq!(BuildConfig::default().module_root(), PathBuf::from("src"));
    }

    #[test]
    fn invalid_value_reports_field() {
        let err = BuildConfig::from_value(json!({ "write_bundle_info": "yes" })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "config"));
    }

    #[test]
    fn to_value_skips_unset_options() {
        let value = BuildConfig::default().to_value().unwrap();
        assert!(value.get("header").is_none());
        assert!(value.get("shake").is_none());
        assert_eq!(value["out_dir"], json!("out"));
    }
}
