use std::path::{Path, PathBuf};

/// One piece of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    /// File the contents came from. `None` for synthetic content such as the
    /// header or plugin output.
    pub path: Option<PathBuf>,
    pub contents: String,
}

impl SourceFragment {
    pub fn from_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            contents: contents.into(),
        }
    }

    pub fn synthetic(contents: impl Into<String>) -> Self {
        Self {
            path: None,
            contents: contents.into(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.path.is_none()
    }
}

/// A fully assembled output file.
///
/// `dest` is relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub dest: PathBuf,
    pub sources: Vec<SourceFragment>,
}

impl BundleFile {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            sources: Vec::new(),
        }
    }

    pub fn push(&mut self, fragment: SourceFragment) {
        self.sources.push(fragment);
    }

    /// Final file contents: fragments joined by newlines.
    pub fn contents(&self) -> String {
        self.sources
            .iter()
            .map(|fragment| fragment.contents.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}
