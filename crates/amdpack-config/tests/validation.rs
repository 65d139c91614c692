use std::fs;

use amdpack_config::{
    BuildConfig, ConfigError, EntryPointSpec, ExtraFile, validate_fs, validate_schema,
};
use tempfile::TempDir;

fn config(entries: Vec<EntryPointSpec>) -> BuildConfig {
    BuildConfig {
        entry_points: entries,
        ..BuildConfig::default()
    }
}

#[test]
fn fs_validator_requires_source_root() {
    let dir = TempDir::new().unwrap();
    let err = validate_fs(&config(vec![EntryPointSpec::new("app")]), dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::SourceRootNotFound(path) if path == dir.path().join("src")));
}

#[test]
fn fs_validator_checks_prepend_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/vs")).unwrap();
    fs::write(dir.path().join("src/vs/loader.js"), "var require;").unwrap();

    let present = EntryPointSpec::new("app").with_prepend(ExtraFile::new("vs/loader.js"));
    assert!(validate_fs(&config(vec![present]), dir.path()).is_ok());

    let missing = EntryPointSpec::new("app").with_append(ExtraFile::new("vs/missing.js"));
    let err = validate_fs(&config(vec![missing]), dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::PrependNotFound { entry, .. } if entry == "app"));
}

#[test]
fn fs_validator_runs_schema_checks_first() {
    let dir = TempDir::new().unwrap();
    let duplicate = config(vec![EntryPointSpec::new("a"), EntryPointSpec::new("a")]);
    assert!(matches!(
        validate_fs(&duplicate, dir.path()),
        Err(ConfigError::DuplicateEntryPoint(_))
    ));
}

#[test]
fn empty_include_id_names_the_list() {
    let err = validate_schema(&config(vec![EntryPointSpec::new("app").with_include([""])]))
        .unwrap_err();
    assert_eq!(err.to_string(), "entry point 'app' has an empty module id in 'include'");
}

#[test]
fn extension_with_separator_is_rejected() {
    let mut config = config(vec![EntryPointSpec::new("app")]);
    config.extension = "d/ts".to_string();
    assert!(matches!(
        validate_schema(&config),
        Err(ConfigError::InvalidValue { field, .. }) if field == "extension"
    ));
}
