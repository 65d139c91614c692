//! AMD id resolution.
//!
//! The same rules a runtime AMD loader applies when it sees a dependency
//! string, reused at build time so the static graph matches what the loader
//! would execute.

use crate::dependency::DependencyRef;
use crate::error::ConfigurationError;
use crate::module_id::{IdInterner, Reserved};

/// True if `spec` must be resolved against the importing module.
pub fn is_relative(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../")
}

/// Collapse `.` and `..` segments of an AMD id.
///
/// Applies `a/./b -> a/b`, `a/b/../c -> a/c` and leading `./` removal until
/// nothing matches. `..` segments that climb past the first segment are kept
/// at the front of the result.
pub fn normalize(id: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in id.split('/') {
        match segment {
            "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Resolve `spec` to an absolute id string.
///
/// Plugin markers are not interpreted here; see [`resolve`].
pub fn resolve_id(from: Option<&str>, spec: &str) -> Result<String, ConfigurationError> {
    if !is_relative(spec) {
        return Ok(normalize(spec));
    }

    let Some(from) = from else {
        return Err(ConfigurationError::UnresolvableRelative {
            spec: spec.to_string(),
            from: None,
        });
    };

    let base = match from.rfind('/') {
        Some(slash) => &from[..=slash],
        None => "",
    };
    let resolved = normalize(&format!("{base}{spec}"));
    if resolved == ".." || resolved.starts_with("../") || resolved.is_empty() {
        return Err(ConfigurationError::UnresolvableRelative {
            spec: spec.to_string(),
            from: Some(from.to_string()),
        });
    }
    Ok(resolved)
}

/// Resolve one raw dependency string as seen from module `from`.
///
/// `from` is `None` for ids coming straight from the entry point list.
/// New ids are interned into `ids`.
///
/// For `plugin!resource` both halves are resolved against `from` when they
/// are relative, so `css!./style` seen from `a/x` and from `b/y` are two
/// nodes. Any other resource text is passed to the plugin as written.
pub fn resolve(
    ids: &mut IdInterner,
    from: Option<&str>,
    spec: &str,
) -> Result<DependencyRef, ConfigurationError> {
    if spec.is_empty() {
        return Err(ConfigurationError::EmptyId {
            from: from.map(str::to_string),
        });
    }

    if let Some(reserved) = Reserved::from_name(spec) {
        return Ok(DependencyRef::Reserved(reserved));
    }

    if let Some((plugin, resource)) = spec.split_once('!') {
        let plugin = match resolve(ids, from, plugin)? {
            DependencyRef::Regular(plugin) => plugin,
            other => {
                return Err(ConfigurationError::InvalidPlugin {
                    spec: spec.to_string(),
                    reason: format!(
                        "plugin must be a regular module, found '{}'",
                        ids.name(other.target())
                    ),
                });
            }
        };
        let resource = if is_relative(resource) {
            resolve_id(from, resource)?
        } else {
            resource.to_string()
        };
        let node = format!("{}!{}", ids.name(plugin), resource);
        return Ok(DependencyRef::Plugin {
            id: ids.intern(&node),
            plugin,
            resource,
        });
    }

    let resolved = resolve_id(from, spec)?;
    Ok(DependencyRef::Regular(ids.intern(&resolved)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_id::ModuleId;

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(normalize("a/./b"), "a/b");
        assert_eq!(normalize("a/b/../c"), "a/c");
        assert_eq!(normalize("./a/b"), "a/b");
        assert_eq!(normalize("a/b/c/../../d"), "a/d");
        assert_eq!(normalize("a/././b/./c"), "a/b/c");
        assert_eq!(normalize("../a"), "../a");
    }

    #[test]
    fn normalize_is_idempotent() {
        for id in ["a/./b/../c", "./x/y/../../z", "vs/base/common/event"] {
            let once = normalize(id);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn relative_ids_resolve_against_importer_directory() {
        assert_eq!(
            resolve_id(Some("vs/base/common/a"), "./b").unwrap(),
            "vs/base/common/b"
        );
        assert_eq!(
            resolve_id(Some("vs/base/common/a"), "../browser/dom").unwrap(),
            "vs/base/browser/dom"
        );
        assert_eq!(resolve_id(Some("app"), "./util").unwrap(), "util");
    }

    #[test]
    fn absolute_ids_are_left_alone() {
        assert_eq!(resolve_id(Some("a/b"), "vs/nls").unwrap(), "vs/nls");
        assert_eq!(resolve_id(None, "util").unwrap(), "util");
    }

    #[test]
    fn relative_without_importer_is_a_configuration_error() {
        let err = resolve_id(None, "./x").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnresolvableRelative {
                spec: "./x".to_string(),
                from: None
            }
        );
    }

    #[test]
    fn relative_escaping_the_root_is_a_configuration_error() {
        assert!(resolve_id(Some("a"), "../b").is_err());
        assert!(resolve_id(Some("a/b"), "../../c").is_err());
    }

    #[test]
    fn reserved_names_skip_normalization() {
        let mut ids = IdInterner::new();
        for (name, id) in [
            ("exports", ModuleId::EXPORTS),
            ("module", ModuleId::MODULE),
            ("require", ModuleId::REQUIRE),
        ] {
            let dep = resolve(&mut ids, Some("a/b"), name).unwrap();
            assert_eq!(dep.target(), id);
            assert!(matches!(dep, DependencyRef::Reserved(_)));
        }
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn plugin_ids_resolve_only_the_plugin_part() {
        let mut ids = IdInterner::new();
        let dep = resolve(&mut ids, Some("vs/editor/widget"), "css!foo?inline").unwrap();
        let DependencyRef::Plugin {
            id,
            plugin,
            resource,
        } = dep
        else {
            panic!("expected plugin reference");
        };
        assert_eq!(ids.name(plugin), "css");
        assert_eq!(resource, "foo?inline");
        assert_eq!(ids.name(id), "css!foo?inline");
    }

    #[test]
    fn relative_resources_resolve_against_the_importer() {
        let mut ids = IdInterner::new();
        let from_a = resolve(&mut ids, Some("a/x"), "vs/css!./style").unwrap();
        let from_b = resolve(&mut ids, Some("b/y"), "vs/css!./style").unwrap();

        assert_eq!(ids.name(from_a.target()), "vs/css!a/style");
        assert_eq!(ids.name(from_b.target()), "vs/css!b/style");
        assert!(matches!(
            from_b,
            DependencyRef::Plugin { ref resource, .. } if resource == "b/style"
        ));
    }

    #[test]
    fn relative_resource_escaping_the_root_is_rejected() {
        let mut ids = IdInterner::new();
        assert!(matches!(
            resolve(&mut ids, Some("app"), "css!../outside"),
            Err(ConfigurationError::UnresolvableRelative { .. })
        ));
    }

    #[test]
    fn relative_plugin_ids_are_resolved_recursively() {
        let mut ids = IdInterner::new();
        let dep = resolve(&mut ids, Some("vs/editor/widget"), "../css!vs/editor/x").unwrap();
        let DependencyRef::Plugin { plugin, id, .. } = dep else {
            panic!("expected plugin reference");
        };
        assert_eq!(ids.name(plugin), "vs/css");
        assert_eq!(ids.name(id), "vs/css!vs/editor/x");
    }

    #[test]
    fn reserved_plugin_is_rejected() {
        let mut ids = IdInterner::new();
        let err = resolve(&mut ids, None, "require!x").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPlugin { .. }));
    }

    #[test]
    fn empty_spec_is_rejected() {
        let mut ids = IdInterner::new();
        assert!(matches!(
            resolve(&mut ids, Some("a"), ""),
            Err(ConfigurationError::EmptyId { .. })
        ));
    }
}
