//! Integration tests for bundle emission over in-memory source trees.

mod helpers;

use std::sync::Arc;

use amdpack_bundler::{
    BuildConfig, ConfigurationError, CssPlugin, EntryPointSpec, Error, ExtraFile, ShakeConfig,
    ShakeLevel,
};
use helpers::{bundle_text, bundler, config, modules, source_tree};

const LEAF: &str = "define([], function () { return {}; });";

#[tokio::test]
async fn excluded_subgraph_is_left_out() {
    let runtime = source_tree(&[
        (
            "app.ts",
            r#"define(["require", "exports", "./util", "./legacy"], function (require, exports) {});"#,
        ),
        ("util.ts", LEAF),
        ("legacy.ts", r#"define(["./oldUtil"], function () {});"#),
        ("oldUtil.ts", LEAF),
    ]);
    let spec = EntryPointSpec::new("app").with_exclude(["legacy"]);
    let output = bundler(config(vec![spec]), runtime).build().await.unwrap();

    assert_eq!(modules(&output, "app"), ["util", "app"]);
    let text = bundle_text(&output, "app");
    assert!(text.starts_with(r#"define("util", [], function () { return {}; });"#));
    assert!(text.contains(r#"define("app", ["require", "exports", "./util", "./legacy"]"#));
    assert!(!text.contains("oldUtil"));
}

#[tokio::test]
async fn shared_modules_are_duplicated_per_bundle() {
    let runtime = source_tree(&[
        ("A.ts", r#"define(["./S"], function (s) {});"#),
        ("B.ts", r#"define(["./S"], function (s) {});"#),
        ("S.ts", LEAF),
    ]);
    let specs = vec![EntryPointSpec::new("A"), EntryPointSpec::new("B")];
    let output = bundler(config(specs), runtime).build().await.unwrap();

    assert_eq!(modules(&output, "A"), ["S", "A"]);
    assert_eq!(modules(&output, "B"), ["S", "B"]);
    assert!(bundle_text(&output, "A").contains(r#"define("S", "#));
    assert!(bundle_text(&output, "B").contains(r#"define("S", "#));
    assert_eq!(output.report.bundles["A"], ["S", "A"]);
}

#[tokio::test]
async fn builds_are_deterministic() {
    let files = [
        ("app.ts", r#"define(["./c", "./a", "./b"], function () {});"#),
        ("a.ts", r#"define(["./shared"], function () {});"#),
        ("b.ts", r#"define(["./shared"], function () {});"#),
        ("c.ts", LEAF),
        ("shared.ts", LEAF),
        ("lonely.ts", LEAF),
    ];
    let spec = || EntryPointSpec::new("app").with_include(["lonely"]);

    let first = bundler(config(vec![spec()]), source_tree(&files))
        .build()
        .await
        .unwrap();
    let second = bundler(config(vec![spec()]), source_tree(&files))
        .build()
        .await
        .unwrap();

    assert_eq!(first.order, second.order);
    assert_eq!(bundle_text(&first, "app"), bundle_text(&second, "app"));
    assert_eq!(
        modules(&first, "app"),
        ["c", "lonely", "shared", "a", "b", "app"]
    );
}

#[tokio::test]
async fn cycles_are_reported_with_both_modules() {
    let runtime = source_tree(&[
        ("A.ts", r#"define(["./B"], function () {});"#),
        ("B.ts", r#"define(["./A"], function () {});"#),
    ]);
    let err = bundler(config(vec![EntryPointSpec::new("A")]), runtime)
        .build()
        .await
        .unwrap_err();

    match err {
        Error::Graph(amdpack_graph::Error::CyclicDependency { remaining }) => {
            assert!(remaining.contains(&"A".to_string()));
            assert!(remaining.contains(&"B".to_string()));
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

#[tokio::test]
async fn css_resources_are_deferred_to_the_plugin() {
    let runtime = source_tree(&[
        ("app.ts", r#"define(["./css!./foo"], function () {});"#),
        ("css.ts", r#"define([], function () { return { load: function () {} }; });"#),
        ("foo.css", ".foo { color: red; }\n"),
    ]);
    let output = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .with_plugin("css", Arc::new(CssPlugin::new()))
        .build()
        .await
        .unwrap();

    assert_eq!(modules(&output, "app"), ["css", "css!foo", "app"]);
    assert!(bundle_text(&output, "app").contains(r#"define("css!foo", {});"#));

    let entry = output.entry("app").unwrap();
    assert_eq!(entry.extra_files.len(), 1);
    assert_eq!(entry.extra_files[0].dest, std::path::PathBuf::from("app.css"));
    assert!(entry.extra_files[0].contents().contains(".foo { color: red; }"));

    assert_eq!(output.plugin_files.len(), 1);
    assert!(output.plugin_files[0].contents().contains("\"foo\""));
}

#[tokio::test]
async fn stylesheets_resolve_against_their_importer() {
    let runtime = source_tree(&[
        ("app.ts", r#"define(["./a/x", "./b/y"], function () {});"#),
        ("a/x.ts", r#"define(["vs/css!./style"], function () {});"#),
        ("b/y.ts", r#"define(["vs/css!./style"], function () {});"#),
        ("vs/css.ts", LEAF),
        ("a/style.css", ".a {}"),
        ("b/style.css", ".b {}"),
        ("style.css", ".root {}"),
    ]);
    let output = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .with_plugin("vs/css", Arc::new(CssPlugin::new()))
        .build()
        .await
        .unwrap();

    assert_eq!(
        modules(&output, "app"),
        ["vs/css", "vs/css!a/style", "a/x", "vs/css!b/style", "b/y", "app"]
    );
    let css = output.entry("app").unwrap().extra_files[0].contents();
    assert_eq!(css, "/* a/style */\n.a {}\n/* b/style */\n.b {}\n");
}

#[tokio::test]
async fn rebuilding_with_the_same_bundler_is_identical() {
    let runtime = source_tree(&[
        ("app.ts", r#"define(["./css!./foo", "./util"], function () {});"#),
        ("util.ts", LEAF),
        ("css.ts", LEAF),
        ("foo.css", ".foo { color: red; }\n"),
    ]);
    let bundler = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .with_plugin("css", Arc::new(CssPlugin::new()));

    let first = bundler.build().await.unwrap();
    let second = bundler.build().await.unwrap();

    let texts = |output: &amdpack_bundler::BuildOutput| -> Vec<String> {
        output.files().map(|file| file.contents()).collect()
    };
    assert_eq!(texts(&first), texts(&second));
    assert_eq!(
        first.entry("app").unwrap().extra_files[0].contents(),
        "/* foo */\n.foo { color: red; }\n"
    );
}

#[tokio::test]
async fn exclude_cut_is_asymmetric() {
    // `shared` is a direct dependency of app, but it is also reachable from
    // the excluded `lib`, so it leaves the bundle.
    let runtime = source_tree(&[
        ("app.ts", r#"define(["./shared"], function () {});"#),
        ("lib.ts", r#"define(["./shared"], function () {});"#),
        ("shared.ts", LEAF),
    ]);
    let spec = EntryPointSpec::new("app").with_exclude(["lib"]);
    let output = bundler(config(vec![spec]), runtime).build().await.unwrap();

    assert_eq!(modules(&output, "app"), ["app"]);
}

#[tokio::test]
async fn module_without_define_is_rejected() {
    let runtime = source_tree(&[
        ("app.ts", r#"define(["./util"], function () {});"#),
        ("util.ts", "export const util = 1;"),
    ]);
    let err = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Graph(amdpack_graph::Error::Configuration(
            ConfigurationError::MissingDefine { ref id, .. }
        )) if id == "util"
    ));
}

#[tokio::test]
async fn unregistered_plugin_is_an_error() {
    let runtime = source_tree(&[
        ("app.ts", r#"define(["text!./a.txt"], function () {});"#),
        ("text.ts", LEAF),
    ]);
    let err = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownPlugin { ref plugin, .. } if plugin == "text"));
}

#[tokio::test]
async fn missing_module_names_its_importer() {
    let runtime = source_tree(&[("app.ts", r#"define(["./gone"], function () {});"#)]);
    let err = bundler(config(vec![EntryPointSpec::new("app")]), runtime)
        .build()
        .await
        .unwrap_err();

    match err {
        Error::Graph(amdpack_graph::Error::Configuration(ConfigurationError::MissingSource {
            id,
            needed_by,
            ..
        })) => {
            assert_eq!(id, "gone");
            assert_eq!(needed_by, ["app"]);
        }
        other => panic!("expected a missing source error, got {other:?}"),
    }
}

#[tokio::test]
async fn header_prepend_and_append_wrap_the_modules() {
    let runtime = source_tree(&[
        ("app.ts", LEAF),
        ("loader.js", "var loader = {};"),
        ("main.js", "define([], function () {});"),
    ]);
    let spec = EntryPointSpec::new("app")
        .with_prepend(ExtraFile::new("loader.js"))
        .with_append(ExtraFile::new("main.js").with_module_id("main"));
    let config = BuildConfig {
        header: Some("/* header */".to_string()),
        ..config(vec![spec])
    };
    let output = bundler(config, runtime).build().await.unwrap();

    let text = bundle_text(&output, "app");
    assert!(text.starts_with("/* header */\nvar loader = {};\ndefine(\"app\", "));
    assert!(text.ends_with(r#"define("main", [], function () {});"#));

    let bundle = &output.entry("app").unwrap().bundle;
    assert!(bundle.sources[0].is_synthetic());
    assert!(!bundle.sources[1].is_synthetic());
}

#[tokio::test]
async fn repeated_helpers_are_blanked() {
    let helper = "var __assign = function () {\n    return 1;\n};\n";
    let a = format!("{helper}define([], function () {{}});");
    let b = format!("{helper}define([\"./a\"], function () {{}});");
    let runtime = source_tree(&[("a.ts", a.as_str()), ("b.ts", b.as_str())]);
    let output = bundler(config(vec![EntryPointSpec::new("b")]), runtime)
        .build()
        .await
        .unwrap();

    let text = bundle_text(&output, "b");
    assert_eq!(text.matches("var __assign").count(), 1);
    assert_eq!(text.lines().count(), a.lines().count() + b.lines().count());
}

#[tokio::test]
async fn shaken_tree_feeds_discovery() {
    let runtime = source_tree(&[
        (
            "app.ts",
            "import './util';\ndefine([\"./util\"], function () {});\n",
        ),
        ("util.ts", "define([], function () { return 1; });\n"),
        ("unused.ts", "define([], function () {});\n"),
    ]);
    let config = BuildConfig {
        shake: Some(ShakeConfig {
            level: ShakeLevel::Files,
            entry_points: vec!["app".to_string()],
            ..ShakeConfig::default()
        }),
        ..config(vec![EntryPointSpec::new("app")])
    };
    let output = bundler(config, runtime.clone()).build().await.unwrap();

    assert_eq!(modules(&output, "app"), ["util", "app"]);
    assert!(runtime.contains("/out/shaken/app.ts"));
    assert!(runtime.contains("/out/shaken/util.ts"));
    assert!(!runtime.contains("/out/shaken/unused.ts"));
    assert!(output.shake_warnings.is_empty(), "{:?}", output.shake_warnings);
}

#[tokio::test]
async fn emitter_rejects_duplicate_entry_names() {
    use amdpack_bundler::{Emitter, PluginContext, PluginRegistry};
    use amdpack_graph::{BuildSession, Discoverer, topological_sort};

    let runtime = source_tree(&[("app.ts", LEAF)]);
    let mut session = BuildSession::new();
    Discoverer::new("/src", runtime.clone())
        .discover_into(&mut session.store, &["app"])
        .await
        .unwrap();
    let order = topological_sort(&session.store).unwrap();

    let plugins = PluginRegistry::new();
    let context = PluginContext::new("/src", runtime);
    let mut emitter = Emitter::new(&mut session, &plugins, context);
    let specs = [EntryPointSpec::new("app"), EntryPointSpec::new("app")];
    let err = emitter.emit_all(&specs, &order).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Graph(amdpack_graph::Error::Configuration(
            ConfigurationError::DuplicateEntryPoint(ref name)
        )) if name == "app"
    ));
}
