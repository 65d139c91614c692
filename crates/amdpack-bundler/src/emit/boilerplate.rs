//! Removal of repeated TypeScript emit helpers.
//!
//! Every compiled module carries its own copy of helpers such as
//! `__extends` or `__awaiter`. Within one bundle only the first copy is
//! needed; later copies are blanked line by line so line numbers stay put.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::output::BundleFile;

static HELPER_START: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^var (__extends|__assign|__decorate|__metadata|__param|__awaiter|__generator)\b")
        .ok()
});

/// Line that closes a helper block.
fn helper_end(helper: &str) -> &'static str {
    match helper {
        "__extends" => "})();",
        _ => "};",
    }
}

/// Blank every helper block in `file` that already appeared earlier in it.
pub fn dedupe_helpers(file: &mut BundleFile) {
    let mut seen = FxHashSet::default();
    for fragment in &mut file.sources {
        if let Some(rewritten) = dedupe_source(&fragment.contents, &mut seen) {
            fragment.contents = rewritten;
        }
    }
}

/// Returns the rewritten source, or `None` when nothing was removed.
fn dedupe_source(source: &str, seen: &mut FxHashSet<String>) -> Option<String> {
    let start = HELPER_START.as_ref()?;
    let mut lines: Vec<&str> = Vec::new();
    let mut removing: Option<&'static str> = None;
    let mut changed = false;

    for line in source.lines() {
        if let Some(end) = removing {
            lines.push("");
            if line.trim_end() == end {
                removing = None;
            }
            continue;
        }

        let Some(captures) = start.captures(line) else {
            lines.push(line);
            continue;
        };
        let helper = &captures[1];
        if seen.insert(helper.to_string()) {
            lines.push(line);
            continue;
        }

        changed = true;
        lines.push("");
        let end = helper_end(helper);
        if !line.trim_end().ends_with(end) {
            removing = Some(end);
        }
    }

    changed.then(|| lines.join("\n"))
}
