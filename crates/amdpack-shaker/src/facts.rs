//! Per-file facts extracted from the syntax tree.
//!
//! A file is parsed and scope-analysed once. Everything the marker and the
//! sweep need afterwards is copied out as byte offsets and names, so the
//! arena holding the tree can be dropped immediately.

use std::ops::Range;
use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentExpression, AwaitExpression, BindingIdentifier,
    BindingProperty, CallExpression, Class, ClassElement, ComputedMemberExpression, Declaration,
    ExportDefaultDeclarationKind, Expression, Function, ImportDeclarationSpecifier,
    ImportExpression, MethodDefinitionKind, NewExpression, PrivateFieldExpression, Program,
    PropertyKey, Statement, StaticMemberExpression, TaggedTemplateExpression, UpdateExpression,
    VariableDeclaration,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_semantic::{ScopeFlags, Semantic, SemanticBuilder};
use oxc_span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashMap;

use crate::error::{Result, ShakeError};

/// What one node (statement, class shell or member) refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Usages {
    /// Top-level names of the same file.
    pub refs: Vec<String>,
    /// Names that resolve to no declaration in the file.
    pub unresolved: Vec<String>,
    /// Property names read through member access or destructuring.
    pub members: Vec<String>,
}

impl Usages {
    fn finish(&mut self) {
        for list in [&mut self.refs, &mut self.unresolved, &mut self.members] {
            list.sort();
            list.dedup();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Imported {
    Default,
    Namespace,
    Named(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ImportSpec {
    pub span: Span,
    pub local: String,
    pub imported: Imported,
}

#[derive(Debug, Clone)]
pub(crate) struct ExportSpec {
    pub span: Span,
    /// Name in this module, or in the source module for re-exports.
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub span: Span,
    pub name: Option<String>,
    pub always_kept: bool,
    pub usages: Usages,
}

#[derive(Debug, Clone)]
pub(crate) struct ClassShape {
    /// Offset just past the opening brace of the body.
    pub body_start: u32,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub(crate) enum StatementKind {
    Import {
        source: String,
        source_span: Span,
        type_only: bool,
        /// Empty for a bare `import './x'`.
        specifiers: Vec<ImportSpec>,
    },
    ExportList {
        source: Option<(String, Span)>,
        type_only: bool,
        specifiers: Vec<ExportSpec>,
    },
    ExportAll {
        source: String,
        /// `export * as ns from`.
        namespace: bool,
    },
    Class(ClassShape),
    Other,
}

#[derive(Debug, Clone)]
pub(crate) struct StatementFacts {
    /// Source range including the leading trivia.
    pub range: Range<u32>,
    pub span: Span,
    pub kind: StatementKind,
    pub always_kept: bool,
    /// Usages outside class members.
    pub usages: Usages,
}

impl StatementFacts {
    fn usages_at(&mut self, offset: u32) -> &mut Usages {
        if let StatementKind::Class(shape) = &mut self.kind {
            if let Some(member) = shape
                .members
                .iter_mut()
                .find(|m| m.span.start <= offset && offset < m.span.end)
            {
                return &mut member.usages;
            }
        }
        &mut self.usages
    }

    pub fn specifier_count(&self) -> usize {
        match &self.kind {
            StatementKind::Import { specifiers, .. } => specifiers.len(),
            StatementKind::ExportList { specifiers, .. } => specifiers.len(),
            _ => 0,
        }
    }

    pub fn members(&self) -> &[Member] {
        match &self.kind {
            StatementKind::Class(shape) => &shape.members,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ExportTarget {
    /// Every statement declaring this top-level name.
    Local(String),
    Statement(usize),
    /// `(statement, specifier)` of an export list.
    Specifier(usize, usize),
}

#[derive(Debug, Clone)]
pub(crate) struct FileFacts {
    pub text: String,
    /// End of the hashbang and directive prologue.
    pub prologue_end: u32,
    pub statements: Vec<StatementFacts>,
    /// Top-level name to the statements declaring it.
    pub declarations: FxHashMap<String, Vec<usize>>,
    /// Local import binding to `(statement, specifier)`.
    pub import_bindings: FxHashMap<String, (usize, usize)>,
    pub exports: FxHashMap<String, ExportTarget>,
    /// Statements of the form `export * from`.
    pub star_exports: Vec<usize>,
}

impl FileFacts {
    /// Offset where the text after the last statement begins.
    pub fn trailing_start(&self) -> u32 {
        self.statements
            .last()
            .map_or(self.prologue_end, |s| s.range.end)
    }

    /// Every module specifier this file imports or re-exports from.
    pub fn import_sources(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|s| match &s.kind {
            StatementKind::Import { source, .. } | StatementKind::ExportAll { source, .. } => {
                Some(source.as_str())
            }
            StatementKind::ExportList {
                source: Some((source, _)),
                ..
            } => Some(source.as_str()),
            _ => None,
        })
    }
}

/// Parse and analyse one file.
///
/// # Errors
///
/// [`ShakeError::Parse`] if the text has syntax errors.
pub(crate) fn analyze(text: String, path: &Path) -> Result<FileFacts> {
    let collected = {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
        let parsed = Parser::new(&allocator, &text, source_type).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .first()
                .map_or_else(|| "parser gave up".to_string(), |e| e.to_string());
            return Err(ShakeError::Parse {
                path: path.to_path_buf(),
                message,
            });
        }
        Collector::run(&parsed.program)
    };

    Ok(FileFacts {
        text,
        prologue_end: collected.prologue_end,
        statements: collected.statements,
        declarations: collected.declarations,
        import_bindings: collected.import_bindings,
        exports: collected.exports,
        star_exports: collected.star_exports,
    })
}

#[derive(Default)]
struct Collector {
    prologue_end: u32,
    statements: Vec<StatementFacts>,
    declarations: FxHashMap<String, Vec<usize>>,
    import_bindings: FxHashMap<String, (usize, usize)>,
    exports: FxHashMap<String, ExportTarget>,
    star_exports: Vec<usize>,
    /// `export <declaration>` statements.
    exporting: Vec<usize>,
}

impl Collector {
    fn run(program: &Program<'_>) -> Self {
        let prologue_end = program
            .directives
            .iter()
            .map(|d| d.span.end)
            .chain(program.hashbang.as_ref().map(|h| h.span.end))
            .max()
            .unwrap_or(0);
        let mut collector = Self {
            prologue_end,
            ..Self::default()
        };

        let mut previous_end = prologue_end;
        for (index, stmt) in program.body.iter().enumerate() {
            let span = stmt.span();
            let facts = collector.statement(index, stmt, span, previous_end..span.end);
            collector.statements.push(facts);
            previous_end = span.end;
        }

        let semantic = SemanticBuilder::new().build(program).semantic;
        collector.attach_symbols(&semantic);

        let mut member_uses = MemberUses::default();
        member_uses.visit_program(program);
        for (at, name) in member_uses.found {
            collector.record(at, |usages| usages.members.push(name));
        }

        for statement in &mut collector.statements {
            statement.usages.finish();
            if let StatementKind::Class(shape) = &mut statement.kind {
                for member in &mut shape.members {
                    member.usages.finish();
                }
            }
        }
        collector.export_declarations();
        collector
    }

    fn statement(
        &mut self,
        index: usize,
        stmt: &Statement<'_>,
        span: Span,
        range: Range<u32>,
    ) -> StatementFacts {
        let mut facts = StatementFacts {
            range,
            span,
            kind: StatementKind::Other,
            always_kept: false,
            usages: Usages::default(),
        };

        match stmt {
            Statement::ImportDeclaration(decl) => {
                let specifiers: Vec<ImportSpec> =
                    decl.specifiers.iter().flatten().map(import_spec).collect();
                for (position, spec) in specifiers.iter().enumerate() {
                    self.import_bindings
                        .insert(spec.local.clone(), (index, position));
                }
                facts.always_kept = specifiers.is_empty();
                facts.kind = StatementKind::Import {
                    source: decl.source.value.to_string(),
                    source_span: decl.source.span,
                    type_only: decl.import_kind.is_type(),
                    specifiers,
                };
            }
            Statement::ExportAllDeclaration(decl) => {
                match &decl.exported {
                    Some(name) => {
                        self.exports
                            .insert(name.name().to_string(), ExportTarget::Statement(index));
                    }
                    None => self.star_exports.push(index),
                }
                facts.always_kept = true;
                facts.kind = StatementKind::ExportAll {
                    source: decl.source.value.to_string(),
                    namespace: decl.exported.is_some(),
                };
            }
            Statement::ExportNamedDeclaration(decl) => match &decl.declaration {
                Some(declaration) => {
                    self.exporting.push(index);
                    self.declaration(index, declaration, &mut facts);
                }
                None => {
                    let specifiers: Vec<ExportSpec> = decl
                        .specifiers
                        .iter()
                        .map(|spec| ExportSpec {
                            span: spec.span,
                            local: spec.local.name().to_string(),
                            exported: spec.exported.name().to_string(),
                        })
                        .collect();
                    for (position, spec) in specifiers.iter().enumerate() {
                        self.exports.insert(
                            spec.exported.clone(),
                            ExportTarget::Specifier(index, position),
                        );
                    }
                    facts.always_kept = specifiers.is_empty();
                    facts.kind = StatementKind::ExportList {
                        source: decl
                            .source
                            .as_ref()
                            .map(|source| (source.value.to_string(), source.span)),
                        type_only: decl.export_kind.is_type(),
                        specifiers,
                    };
                }
            },
            Statement::ExportDefaultDeclaration(decl) => {
                self.exports
                    .insert("default".to_string(), ExportTarget::Statement(index));
                match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        self.declare_binding(func.id.as_ref(), index);
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        self.declare_binding(class.id.as_ref(), index);
                        facts.kind = StatementKind::Class(class_shape(class));
                    }
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(iface) => {
                        self.declare(&iface.id.name, index);
                    }
                    _ => facts.always_kept = true,
                }
            }
            Statement::TSExportAssignment(_) => facts.always_kept = true,
            Statement::VariableDeclaration(var) => {
                facts.always_kept = initializes_with_side_effects(var);
            }
            Statement::FunctionDeclaration(func) => self.declare_binding(func.id.as_ref(), index),
            Statement::ClassDeclaration(class) => {
                self.declare_binding(class.id.as_ref(), index);
                facts.kind = StatementKind::Class(class_shape(class));
            }
            Statement::TSInterfaceDeclaration(decl) => self.declare(&decl.id.name, index),
            Statement::TSEnumDeclaration(decl) => self.declare(&decl.id.name, index),
            Statement::TSTypeAliasDeclaration(decl) => self.declare(&decl.id.name, index),
            _ => facts.always_kept = is_control_flow(stmt),
        }

        facts
    }

    fn declaration(&mut self, index: usize, declaration: &Declaration<'_>, facts: &mut StatementFacts) {
        match declaration {
            Declaration::VariableDeclaration(var) => {
                facts.always_kept = initializes_with_side_effects(var);
            }
            Declaration::FunctionDeclaration(func) => self.declare_binding(func.id.as_ref(), index),
            Declaration::ClassDeclaration(class) => {
                self.declare_binding(class.id.as_ref(), index);
                facts.kind = StatementKind::Class(class_shape(class));
            }
            Declaration::TSInterfaceDeclaration(decl) => self.declare(&decl.id.name, index),
            Declaration::TSEnumDeclaration(decl) => self.declare(&decl.id.name, index),
            Declaration::TSTypeAliasDeclaration(decl) => self.declare(&decl.id.name, index),
            _ => {}
        }
    }

    fn declare_binding(&mut self, id: Option<&BindingIdentifier<'_>>, index: usize) {
        if let Some(id) = id {
            self.declare(&id.name, index);
        }
    }

    fn declare(&mut self, name: &str, index: usize) {
        let statements = self.declarations.entry(name.to_string()).or_default();
        if !statements.contains(&index) {
            statements.push(index);
        }
    }

    /// Attach top-level declarations and every reference to the statement
    /// (or class member) it occurs in.
    fn attach_symbols(&mut self, semantic: &Semantic<'_>) {
        let scoping = semantic.scoping();
        let nodes = semantic.nodes();
        let root = scoping.root_scope_id();

        for symbol in scoping.symbol_ids() {
            if scoping.symbol_scope_id(symbol) != root {
                continue;
            }
            let name = scoping.symbol_name(symbol).to_string();

            if let Some(index) = self.locate(scoping.symbol_span(symbol).start) {
                if !matches!(self.statements[index].kind, StatementKind::Import { .. }) {
                    self.declare(&name, index);
                }
            }

            for &reference in scoping.get_resolved_reference_ids(symbol) {
                let node = scoping.get_reference(reference).node_id();
                let at = nodes.get_node(node).kind().span().start;
                self.record(at, |usages| usages.refs.push(name.clone()));
            }
        }

        for (name, references) in scoping.root_unresolved_references().iter() {
            let name = name.to_string();
            for &reference in references.iter() {
                let node = scoping.get_reference(reference).node_id();
                let at = nodes.get_node(node).kind().span().start;
                self.record(at, |usages| usages.unresolved.push(name.clone()));
            }
        }
    }

    fn export_declarations(&mut self) {
        for (name, statements) in &self.declarations {
            if statements.iter().any(|s| self.exporting.contains(s)) {
                self.exports
                    .entry(name.clone())
                    .or_insert_with(|| ExportTarget::Local(name.clone()));
            }
        }
    }

    fn record(&mut self, at: u32, apply: impl FnOnce(&mut Usages)) {
        if let Some(index) = self.locate(at) {
            apply(self.statements[index].usages_at(at));
        }
    }

    /// Top-level statement containing `offset`.
    fn locate(&self, offset: u32) -> Option<usize> {
        let after = self.statements.partition_point(|s| s.span.start <= offset);
        let index = after.checked_sub(1)?;
        (offset < self.statements[index].span.end).then_some(index)
    }
}

fn import_spec(spec: &ImportDeclarationSpecifier<'_>) -> ImportSpec {
    match spec {
        ImportDeclarationSpecifier::ImportSpecifier(named) => ImportSpec {
            span: named.span,
            local: named.local.name.to_string(),
            imported: Imported::Named(named.imported.name().to_string()),
        },
        ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => ImportSpec {
            span: default.span,
            local: default.local.name.to_string(),
            imported: Imported::Default,
        },
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => ImportSpec {
            span: namespace.span,
            local: namespace.local.name.to_string(),
            imported: Imported::Namespace,
        },
    }
}

fn class_shape(class: &Class<'_>) -> ClassShape {
    ClassShape {
        body_start: class.body.span.start + 1,
        members: class.body.body.iter().map(member).collect(),
    }
}

fn member(element: &ClassElement<'_>) -> Member {
    let (name, forced) = match element {
        ClassElement::MethodDefinition(method) => (
            member_name(&method.key),
            method.computed
                || !method.decorators.is_empty()
                || matches!(method.kind, MethodDefinitionKind::Constructor),
        ),
        ClassElement::PropertyDefinition(prop) => (
            member_name(&prop.key),
            prop.computed
                || !prop.decorators.is_empty()
                || (prop.r#static && prop.value.as_ref().is_some_and(|v| has_side_effects(v))),
        ),
        ClassElement::AccessorProperty(accessor) => (
            member_name(&accessor.key),
            accessor.computed
                || !accessor.decorators.is_empty()
                || (accessor.r#static
                    && accessor.value.as_ref().is_some_and(|v| has_side_effects(v))),
        ),
        ClassElement::StaticBlock(_) | ClassElement::TSIndexSignature(_) => (None, true),
    };
    let always_kept = forced || name.as_deref().is_some_and(is_runtime_member);

    Member {
        span: element.span(),
        name,
        always_kept,
        usages: Usages::default(),
    }
}

fn member_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::PrivateIdentifier(id) => Some(format!("#{}", id.name)),
        _ => key.static_name().map(|name| name.to_string()),
    }
}

/// Members called by the runtime or by convention rather than by name in
/// source.
fn is_runtime_member(name: &str) -> bool {
    matches!(name, "toJSON" | "toString" | "dispose")
        || (name.starts_with('_') && name.ends_with("Brand"))
}

fn is_control_flow(stmt: &Statement<'_>) -> bool {
    matches!(
        stmt,
        Statement::ExpressionStatement(_)
            | Statement::IfStatement(_)
            | Statement::ForStatement(_)
            | Statement::ForInStatement(_)
            | Statement::ForOfStatement(_)
            | Statement::WhileStatement(_)
            | Statement::DoWhileStatement(_)
            | Statement::SwitchStatement(_)
            | Statement::TryStatement(_)
            | Statement::BlockStatement(_)
            | Statement::LabeledStatement(_)
            | Statement::ThrowStatement(_)
            | Statement::WithStatement(_)
    )
}

fn initializes_with_side_effects(var: &VariableDeclaration<'_>) -> bool {
    var.declarations
        .iter()
        .filter_map(|declarator| declarator.init.as_ref())
        .any(|init| has_side_effects(init))
}

/// True if evaluating `expr` may do more than build a value.
fn has_side_effects(expr: &Expression<'_>) -> bool {
    let mut finder = SideEffects::default();
    finder.visit_expression(expr);
    finder.found
}

#[derive(Default)]
struct SideEffects {
    found: bool,
}

impl<'a> Visit<'a> for SideEffects {
    fn visit_call_expression(&mut self, _it: &CallExpression<'a>) {
        self.found = true;
    }

    fn visit_new_expression(&mut self, _it: &NewExpression<'a>) {
        self.found = true;
    }

    fn visit_assignment_expression(&mut self, _it: &AssignmentExpression<'a>) {
        self.found = true;
    }

    fn visit_update_expression(&mut self, _it: &UpdateExpression<'a>) {
        self.found = true;
    }

    fn visit_tagged_template_expression(&mut self, _it: &TaggedTemplateExpression<'a>) {
        self.found = true;
    }

    fn visit_await_expression(&mut self, _it: &AwaitExpression<'a>) {
        self.found = true;
    }

    fn visit_import_expression(&mut self, _it: &ImportExpression<'a>) {
        self.found = true;
    }

    // Function and class bodies run later, if at all.
    fn visit_function(&mut self, _it: &Function<'a>, _flags: ScopeFlags) {}

    fn visit_arrow_function_expression(&mut self, _it: &ArrowFunctionExpression<'a>) {}

    fn visit_class(&mut self, _it: &Class<'a>) {}
}

/// Collects `(offset, property name)` for every property read.
#[derive(Default)]
struct MemberUses {
    found: Vec<(u32, String)>,
}

impl<'a> Visit<'a> for MemberUses {
    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        self.found
            .push((it.property.span.start, it.property.name.to_string()));
        walk::walk_static_member_expression(self, it);
    }

    fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
        if let Expression::StringLiteral(key) = &it.expression {
            self.found.push((key.span.start, key.value.to_string()));
        }
        walk::walk_computed_member_expression(self, it);
    }

    fn visit_private_field_expression(&mut self, it: &PrivateFieldExpression<'a>) {
        self.found
            .push((it.field.span.start, format!("#{}", it.field.name)));
        walk::walk_private_field_expression(self, it);
    }

    fn visit_binding_property(&mut self, it: &BindingProperty<'a>) {
        if let Some(name) = it.key.static_name() {
            self.found.push((it.span.start, name.to_string()));
        }
        walk::walk_binding_property(self, it);
    }
}
