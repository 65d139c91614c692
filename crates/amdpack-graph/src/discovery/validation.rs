//! Mapping module ids onto source files.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::error::ConfigurationError;

/// Physical path of module `id` under `root`.
///
/// Rejects ids that would land outside `root`, such as absolute ids or ids
/// that still start with `..` after cleaning.
pub fn module_path(root: &Path, id: &str, extension: &str) -> Result<PathBuf, ConfigurationError> {
    let file = if extension.is_empty() {
        id.to_string()
    } else {
        format!("{id}.{extension}")
    };

    let relative = Path::new(&file).clean();
    if relative.is_absolute() || relative.starts_with("..") {
        return Err(ConfigurationError::PathOutsideRoot {
            id: id.to_string(),
            path: relative,
        });
    }

    Ok(root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_appends_extension() {
        let path = module_path(Path::new("/src"), "vs/base/common/event", "ts").unwrap();
        assert_eq!(path, PathBuf::from("/src/vs/base/common/event.ts"));
    }

    #[test]
    fn test_module_path_without_extension() {
        let path = module_path(Path::new("src"), "vs/loader.js", "").unwrap();
        assert_eq!(path, PathBuf::from("src/vs/loader.js"));
    }

    #[test]
    fn test_module_path_rejects_absolute_ids() {
        let err = module_path(Path::new("/src"), "/etc/passwd", "ts").unwrap_err();
        assert!(matches!(err, ConfigurationError::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_module_path_rejects_traversal() {
        assert!(module_path(Path::new("/src"), "../outside", "ts").is_err());
        assert!(module_path(Path::new("/src"), "a/../../outside", "ts").is_err());
    }
}
