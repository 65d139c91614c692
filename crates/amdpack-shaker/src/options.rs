//! Options for one shaking pass.

use std::path::{Path, PathBuf};

use amdpack_config::{ShakeConfig, ShakeLevel};
use amdpack_graph::{DEFAULT_EXTENSION, resolve_id};
use regex::Regex;

use crate::error::{Result, ShakeError};

/// Prefix of the module key given to inline entry point `i`.
pub const INLINE_ENTRY_PREFIX: &str = "inlineEntryPoint";

#[derive(Debug, Clone)]
pub struct ShakeOptions {
    /// Directory that module keys are relative to.
    pub source_root: PathBuf,
    pub level: ShakeLevel,
    /// Module ids whose files are kept whole and shaking starts from.
    pub entry_points: Vec<String>,
    /// Synthetic sources, parsed as if they were files in the source root.
    pub inline_entry_points: Vec<String>,
    /// Import specifiers matching this are never followed.
    pub import_ignore_pattern: Option<Regex>,
    /// Source file extension, without the leading dot.
    pub extension: String,
}

/// Where an import specifier leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImportTarget {
    Module(String),
    /// Plugin-qualified or ignored; never followed.
    Skipped,
    /// Climbs out of the source root.
    Unresolvable,
}

impl ShakeOptions {
    pub fn new<I, S>(source_root: impl Into<PathBuf>, entry_points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_root: source_root.into(),
            level: ShakeLevel::default(),
            entry_points: entry_points.into_iter().map(Into::into).collect(),
            inline_entry_points: Vec::new(),
            import_ignore_pattern: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Options for the `[shake]` table of a build configuration.
    ///
    /// # Errors
    ///
    /// [`ShakeError::InvalidPattern`] if `import_ignore_pattern` is not a
    /// valid regex.
    pub fn from_config(source_root: &Path, config: &ShakeConfig) -> Result<Self> {
        let mut options = Self::new(source_root, config.entry_points.iter().cloned())
            .with_level(config.level)
            .with_inline_entry_points(config.inline_entry_points.iter().cloned());
        if let Some(pattern) = &config.import_ignore_pattern {
            options = options.with_import_ignore_pattern(pattern)?;
        }
        Ok(options)
    }

    pub fn with_level(mut self, level: ShakeLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_inline_entry_points<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline_entry_points
            .extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn with_import_ignore_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| ShakeError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.import_ignore_pattern = Some(regex);
        Ok(self)
    }

    /// Use a different source file extension. A leading `.` is ignored.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Module key of inline entry point `index`.
    pub fn inline_entry_key(index: usize) -> String {
        format!("{INLINE_ENTRY_PREFIX}.{index}")
    }

    /// Module key a specifier written in module `from` refers to.
    pub(crate) fn import_target(&self, from: &str, specifier: &str) -> ImportTarget {
        if specifier.contains('!') {
            return ImportTarget::Skipped;
        }
        if self
            .import_ignore_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(specifier))
        {
            return ImportTarget::Skipped;
        }

        match resolve_id(Some(from), self.strip_extension(specifier)) {
            Ok(key) if !key.is_empty() => ImportTarget::Module(key),
            _ => ImportTarget::Unresolvable,
        }
    }

    fn strip_extension<'s>(&self, specifier: &'s str) -> &'s str {
        [".js", ".ts", self.extension.as_str()]
            .into_iter()
            .filter(|ext| !ext.is_empty())
            .find_map(|ext| {
                let ext = ext.trim_start_matches('.');
                specifier
                    .strip_suffix(ext)
                    .and_then(|rest| rest.strip_suffix('.'))
            })
            .unwrap_or(specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ShakeOptions {
        ShakeOptions::new("/src", ["app"])
    }

    #[test]
    fn relative_imports_resolve_against_the_importer() {
        let options = options();
        assert_eq!(
            options.import_target("vs/base/common/event", "./lifecycle"),
            ImportTarget::Module("vs/base/common/lifecycle".to_string())
        );
        assert_eq!(
            options.import_target("vs/base/common/event", "../browser/dom.js"),
            ImportTarget::Module("vs/base/browser/dom".to_string())
        );
    }

    #[test]
    fn inline_entries_resolve_from_the_root() {
        let key = ShakeOptions::inline_entry_key(0);
        assert_eq!(key, "inlineEntryPoint.0");
        assert_eq!(
            options().import_target(&key, "./util"),
            ImportTarget::Module("util".to_string())
        );
    }

    #[test]
    fn plugin_and_ignored_imports_are_skipped() {
        let options = options().with_import_ignore_pattern(r"\.css$").unwrap();
        assert_eq!(options.import_target("app", "vs/css!./foo"), ImportTarget::Skipped);
        assert_eq!(options.import_target("app", "./theme.css"), ImportTarget::Skipped);
    }

    #[test]
    fn escaping_the_root_is_unresolvable() {
        assert_eq!(options().import_target("app", "../outside"), ImportTarget::Unresolvable);
    }

    #[test]
    fn from_config_rejects_bad_patterns() {
        let config = ShakeConfig {
            import_ignore_pattern: Some("(".to_string()),
            ..ShakeConfig::default()
        };
        assert!(matches!(
            ShakeOptions::from_config(Path::new("/src"), &config),
            Err(ShakeError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn from_config_copies_level_and_entries() {
        let config = ShakeConfig {
            level: ShakeLevel::ClassMembers,
            entry_points: vec!["app".to_string()],
            inline_entry_points: vec!["import './a';".to_string()],
            ..ShakeConfig::default()
        };
        let options = ShakeOptions::from_config(Path::new("/src"), &config)
            .unwrap()
            .with_extension(".tsx");
        assert_eq!(options.level, ShakeLevel::ClassMembers);
        assert_eq!(options.entry_points, ["app"]);
        assert_eq!(options.inline_entry_points.len(), 1);
        assert_eq!(options.extension, "tsx");
    }
}
