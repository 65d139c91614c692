//! Tree-shaking options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Granularity at which the tree-shaker may delete code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShakeLevel {
    /// Keep or drop whole files.
    Files = 0,
    /// Keep or drop individual top-level statements.
    #[default]
    InnerFile = 1,
    /// Additionally keep or drop individual class members.
    ClassMembers = 2,
}

impl ShakeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::InnerFile => "inner-file",
            Self::ClassMembers => "class-members",
        }
    }
}

impl std::fmt::Display for ShakeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShakeConfig {
    #[serde(default)]
    pub level: ShakeLevel,

    /// Module ids whose files are the roots of the shake.
    #[serde(default)]
    pub entry_points: Vec<String>,

    /// Synthetic TypeScript snippets that reference otherwise unused exports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_entry_points: Vec<String>,

    /// Imports whose specifier matches this regex are never followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_ignore_pattern: Option<String>,

    /// Where the shaken tree is written. Defaults to `<out_dir>/shaken`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}
