//! Entry point specifications.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One bundle to produce.
///
/// The bundle contains every module reachable from `name` and `include`,
/// minus everything reachable from any `exclude` root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointSpec {
    /// Module id of the entry point.
    pub name: String,

    /// Output path relative to the output directory. Defaults to `<name>.js`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    /// Additional roots bundled alongside `name`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Roots whose entire reachable subgraph is removed from the bundle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Files placed before the modules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepend: Vec<ExtraFile>,

    /// Files placed after the modules and plugin output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub append: Vec<ExtraFile>,
}

/// A file copied verbatim into a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFile {
    /// Path relative to the source root.
    pub path: PathBuf,

    /// When set, the file's first `define(` is rewritten to carry this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amd_module_id: Option<String>,
}

impl EntryPointSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_include<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn with_prepend(mut self, file: ExtraFile) -> Self {
        self.prepend.push(file);
        self
    }

    pub fn with_append(mut self, file: ExtraFile) -> Self {
        self.append.push(file);
        self
    }

    /// Output path of the bundle, relative to the output directory.
    pub fn dest_path(&self) -> PathBuf {
        match &self.dest {
            Some(dest) => dest.clone(),
            None => PathBuf::from(format!("{}.js", self.name)),
        }
    }

    /// `{name} ∪ include`, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.include.iter().map(String::as_str))
    }
}

impl ExtraFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            amd_module_id: None,
        }
    }

    pub fn with_module_id(mut self, id: impl Into<String>) -> Self {
        self.amd_module_id = Some(id.into());
        self
    }
}

/// First entry point whose name was already used by an earlier one.
pub fn duplicate_name(specs: &[EntryPointSpec]) -> Option<&str> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .map(|spec| spec.name.as_str())
        .find(|name| !seen.insert(*name))
}
