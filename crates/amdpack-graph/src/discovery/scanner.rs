//! Lightweight dependency pre-scan.
//!
//! Collects the raw dependency strings of one module without type-checking
//! it: the dependency array of a top-level `define(...)` call, `import`
//! sources and `export ... from` sources. If the file does not parse, a
//! regex scan of the same shapes is used instead.

use std::path::Path;
use std::sync::LazyLock;

use oxc_allocator::Allocator;
use oxc_ast::ast::{ArrayExpressionElement, Argument, CallExpression, Expression, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

static DEFINE_DEPS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"define\s*\(\s*(?:["'][^"']*["']\s*,\s*)?\[([^\]]*)\]"#).ok()
});
static QUOTED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).ok());
static FROM_CLAUSE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?[^'";]*?\bfrom\s*["']([^"']+)["']"#).ok()
});
static BARE_IMPORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s*["']([^"']+)["']"#).ok());

/// Raw dependency strings of `source`, in source order, without duplicates.
pub fn scan_dependencies(source: &str, path: &Path) -> Vec<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    let parsed = Parser::new(&allocator, source, source_type).parse();

    if !parsed.errors.is_empty() || parsed.panicked {
        tracing::debug!(
            path = %path.display(),
            errors = parsed.errors.len(),
            "parse failed, falling back to pattern scan"
        );
        return scan_with_patterns(source);
    }

    let mut specs = Vec::new();
    for stmt in &parsed.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) if !decl.import_kind.is_type() => {
                push_unique(&mut specs, decl.source.value.as_str());
            }
            Statement::ExportAllDeclaration(decl) if !decl.export_kind.is_type() => {
                push_unique(&mut specs, decl.source.value.as_str());
            }
            Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
                if let Some(source) = &decl.source {
                    push_unique(&mut specs, source.value.as_str());
                }
            }
            Statement::ExpressionStatement(stmt) => {
                if let Expression::CallExpression(call) = &stmt.expression {
                    collect_define_dependencies(call, &mut specs);
                }
            }
            _ => {}
        }
    }
    specs
}

fn collect_define_dependencies(call: &CallExpression<'_>, specs: &mut Vec<String>) {
    let Expression::Identifier(callee) = &call.callee else {
        return;
    };
    if callee.name.as_str() != "define" {
        return;
    }

    let Some(Argument::ArrayExpression(array)) = call
        .arguments
        .iter()
        .find(|arg| matches!(arg, Argument::ArrayExpression(_)))
    else {
        return;
    };

    for element in &array.elements {
        if let ArrayExpressionElement::StringLiteral(lit) = element {
            push_unique(specs, lit.value.as_str());
        }
    }
}

/// Regex fallback for sources the parser rejects.
fn scan_with_patterns(source: &str) -> Vec<String> {
    let mut specs = Vec::new();

    if let (Some(define), Some(quoted)) = (DEFINE_DEPS.as_ref(), QUOTED.as_ref()) {
        if let Some(caps) = define.captures(source) {
            for dep in quoted.captures_iter(&caps[1]) {
                push_unique(&mut specs, &dep[1]);
            }
        }
    }

    for pattern in [FROM_CLAUSE.as_ref(), BARE_IMPORT.as_ref()].into_iter().flatten() {
        for caps in pattern.captures_iter(source) {
            push_unique(&mut specs, &caps[1]);
        }
    }

    specs
}

fn push_unique(specs: &mut Vec<String>, spec: &str) {
    if !specs.iter().any(|existing| existing == spec) {
        specs.push(spec.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<String> {
        scan_dependencies(source, Path::new("module.ts"))
    }

    #[test]
    fn collects_define_array() {
        let deps = scan(r#"define(["require", "exports", "./util", "css!./foo"], function (require, exports, util) {});"#);
        assert_eq!(deps, ["require", "exports", "./util", "css!./foo"]);
    }

    #[test]
    fn collects_named_define_array() {
        let deps = scan(r#"define("app", ["util"], function (util) {});"#);
        assert_eq!(deps, ["util"]);
    }

    #[test]
    fn collects_es_imports_and_reexports() {
        let deps = scan(
            r#"
import { a } from './a';
import './side-effect';
import type { T } from './types';
export * from './b';
export { c } from './c';
const x = 1;
"#,
        );
        assert_eq!(deps, ["./a", "./side-effect", "./b", "./c"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let deps = scan(r#"define(["./a", "./a"], function () {}); import './a';"#);
        assert_eq!(deps, ["./a"]);
    }

    #[test]
    fn other_calls_are_ignored() {
        assert!(scan(r#"require(["./a"], function () {});"#).is_empty());
    }

    #[test]
    fn falls_back_to_patterns_on_parse_errors() {
        let deps = scan("define(['./ok', 'css!./x'], function () { this is not javascript");
        assert_eq!(deps, ["./ok", "css!./x"]);

        let deps = scan("import { a } from './a';\nimport './b';\nclass {");
        assert_eq!(deps, ["./a", "./b"]);
    }
}
