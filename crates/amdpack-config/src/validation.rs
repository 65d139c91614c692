//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).

use std::path::Path;

use regex::Regex;

use crate::config::BuildConfig;
use crate::entry::duplicate_name;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use amdpack_config::{BuildConfig, ConfigValidator, EntryPointSpec, SchemaValidator};
///
/// let mut config = BuildConfig::default();
/// config.entry_points = vec![EntryPointSpec::new("app")];
///
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        for (index, spec) in config.entry_points.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { index });
            }

            for (list, ids) in [("include", &spec.include), ("exclude", &spec.exclude)] {
                if ids.iter().any(|id| id.trim().is_empty()) {
                    return Err(ConfigError::EmptyModuleId {
                        entry: spec.name.clone(),
                        list,
                    });
                }
            }
        }
        if let Some(name) = duplicate_name(&config.entry_points) {
            return Err(ConfigError::DuplicateEntryPoint(name.to_string()));
        }

        if config.extension.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "extension".to_string(),
                hint: Some("The extension cannot contain a path separator".to_string()),
            });
        }

        if let Some(shake) = &config.shake {
            if let Some(pattern) = &shake.import_ignore_pattern {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
            if shake.entry_points.iter().any(|id| id.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "shake.entry_points".to_string(),
                    hint: Some("Remove empty strings from the list".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Checks that the source root and every prepend/append file exist. Relative
/// paths are resolved against `root`.
pub struct FsValidator {
    root: std::path::PathBuf,
}

impl FsValidator {
    /// Create a new filesystem validator with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        let source_root = self.root.join(&config.source_root);
        if !source_root.is_dir() {
            return Err(ConfigError::SourceRootNotFound(source_root));
        }

        for spec in &config.entry_points {
            for file in spec.prepend.iter().chain(&spec.append) {
                let path = source_root.join(&file.path);
                if !path.exists() {
                    return Err(ConfigError::PrependNotFound {
                        entry: spec.name.clone(),
                        path,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &BuildConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &BuildConfig, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryPointSpec;
    use crate::shake::ShakeConfig;

    fn config_with(entries: Vec<EntryPointSpec>) -> BuildConfig {
        BuildConfig {
            entry_points: entries,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn schema_validator_accepts_valid_config() {
        let config = config_with(vec![
            EntryPointSpec::new("a"),
            EntryPointSpec::new("b").with_exclude(["a"]),
        ]);
        assert!(SchemaValidator.validate(&config).is_ok());
    }

    #[test]
    fn schema_validator_rejects_duplicate_names() {
        let config = config_with(vec![EntryPointSpec::new("app"), EntryPointSpec::new("app")]);
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::DuplicateEntryPoint(name)) if name == "app"
        ));
    }

    #[test]
    fn schema_validator_rejects_empty_name() {
        let config = config_with(vec![EntryPointSpec::new("app"), EntryPointSpec::new(" ")]);
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::EmptyName { index: 1 })
        ));
    }

    #[test]
    fn schema_validator_rejects_empty_exclude_id() {
        let config = config_with(vec![EntryPointSpec::new("app").with_exclude([""])]);
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::EmptyModuleId { list: "exclude", .. })
        ));
    }

    #[test]
    fn schema_validator_rejects_bad_ignore_pattern() {
        let mut config = config_with(vec![EntryPointSpec::new("app")]);
        config.shake = Some(ShakeConfig {
            import_ignore_pattern: Some("(unclosed".to_string()),
            ..ShakeConfig::default()
        });
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
