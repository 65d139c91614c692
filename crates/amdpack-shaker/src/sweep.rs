//! The sweep phase: print what the mark phase kept.
//!
//! Output is cut from the original text wherever possible. Only import and
//! export lists that lost some of their specifiers are regenerated.

use amdpack_config::ShakeLevel;

use crate::color::{ColorMap, NodeColor};
use crate::facts::{ClassShape, FileFacts, ImportSpec, Imported, StatementFacts, StatementKind};
use crate::mark::ShakeFile;

/// Contents of a needed file that kept nothing, so it still loads as a
/// module.
pub const DUMMY_EXPORT: &str = "export const __dummy = 0;\n";

/// Text of `file` after shaking. Empty if nothing was kept.
pub(crate) fn render(file: &ShakeFile, colors: &ColorMap, level: ShakeLevel) -> String {
    let facts = &file.facts;
    if file.root {
        return facts.text.clone();
    }
    if level == ShakeLevel::Files {
        let reached = file.statements.iter().any(|n| colors.get(*n) != NodeColor::White);
        return if reached { facts.text.clone() } else { String::new() };
    }

    let mut body = String::new();
    for (index, statement) in facts.statements.iter().enumerate() {
        match colors.get(file.statements[index]) {
            NodeColor::White => {}
            NodeColor::Black => body.push_str(slice(&facts.text, statement.range.start, statement.range.end)),
            NodeColor::Gray => render_partial(file, colors, index, &mut body),
        }
    }
    if body.is_empty() {
        return body;
    }

    let mut out = String::with_capacity(facts.text.len());
    out.push_str(slice(&facts.text, 0, facts.prologue_end));
    out.push_str(&body);
    out.push_str(slice(&facts.text, facts.trailing_start(), facts.text.len() as u32));
    out
}

fn render_partial(file: &ShakeFile, colors: &ColorMap, index: usize, out: &mut String) {
    let facts = &file.facts;
    let statement = &facts.statements[index];
    match &statement.kind {
        StatementKind::Class(shape) => {
            let kept: Vec<bool> = file.members[index]
                .iter()
                .map(|n| colors.get(*n) == NodeColor::Black)
                .collect();
            render_class(facts, statement, shape, &kept, out);
        }
        StatementKind::Import { .. } | StatementKind::ExportList { .. } => {
            let kept: Vec<bool> = file.specifiers[index]
                .iter()
                .map(|n| colors.get(*n) == NodeColor::Black)
                .collect();
            if kept.iter().all(|k| *k) {
                out.push_str(slice(&facts.text, statement.range.start, statement.range.end));
            } else if kept.iter().any(|k| *k) {
                render_list(facts, statement, &kept, out);
            }
        }
        _ => out.push_str(slice(&facts.text, statement.range.start, statement.range.end)),
    }
}

/// Class header, kept members with the trivia in front of each, closing brace.
fn render_class(facts: &FileFacts, statement: &StatementFacts, shape: &ClassShape, kept: &[bool], out: &mut String) {
    let text = &facts.text;
    out.push_str(slice(text, statement.range.start, shape.body_start));

    let mut previous_end = shape.body_start;
    for (member, keep) in shape.members.iter().zip(kept) {
        if *keep {
            out.push_str(slice(text, previous_end, member.span.end));
        }
        previous_end = member.span.end;
    }
    out.push_str(slice(text, previous_end, statement.span.end));
}

/// Rebuild an import or export list from its surviving specifiers.
fn render_list(facts: &FileFacts, statement: &StatementFacts, kept: &[bool], out: &mut String) {
    let text = &facts.text;
    out.push_str(slice(text, statement.range.start, statement.span.start));

    match &statement.kind {
        StatementKind::Import {
            source_span,
            type_only,
            specifiers,
            ..
        } => {
            let survivors: Vec<&ImportSpec> = specifiers
                .iter()
                .zip(kept)
                .filter(|(_, keep)| **keep)
                .map(|(spec, _)| spec)
                .collect();

            let mut clauses = Vec::new();
            let mut named = Vec::new();
            for spec in survivors {
                let written = slice(text, spec.span.start, spec.span.end);
                match spec.imported {
                    Imported::Named(_) => named.push(written),
                    Imported::Default | Imported::Namespace => clauses.push(written.to_string()),
                }
            }
            if !named.is_empty() {
                clauses.push(format!("{{ {} }}", named.join(", ")));
            }

            out.push_str("import ");
            if *type_only {
                out.push_str("type ");
            }
            out.push_str(&clauses.join(", "));
            out.push_str(" from ");
            out.push_str(slice(text, source_span.start, source_span.end));
            out.push(';');
        }
        StatementKind::ExportList {
            source,
            type_only,
            specifiers,
        } => {
            let survivors: Vec<&str> = specifiers
                .iter()
                .zip(kept)
                .filter(|(_, keep)| **keep)
                .map(|(spec, _)| slice(text, spec.span.start, spec.span.end))
                .collect();

            out.push_str("export ");
            if *type_only {
                out.push_str("type ");
            }
            out.push_str(&format!("{{ {} }}", survivors.join(", ")));
            if let Some((_, span)) = source {
                out.push_str(" from ");
                out.push_str(slice(text, span.start, span.end));
            }
            out.push(';');
        }
        _ => {}
    }
}

fn slice(text: &str, start: u32, end: u32) -> &str {
    text.get(start as usize..end as usize).unwrap_or_default()
}
