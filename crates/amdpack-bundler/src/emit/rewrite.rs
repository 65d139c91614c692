/// Rewrite the first `define(` in `contents` to `define("<id>", `.
///
/// This is a textual replacement: it relies on every module opening with a
/// single top-level `define(` call. Returns `None` if there is none.
pub fn rewrite_define(contents: &str, id: &str) -> Option<String> {
    let at = contents.find("define(")?;
    let rest = &contents[at + "define(".len()..];
    let mut out = String::with_capacity(contents.len() + id.len() + 4);
    out.push_str(&contents[..at]);
    out.push_str("define(\"");
    out.push_str(id);
    out.push_str("\", ");
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_define_gets_an_id() {
        assert_eq!(
            rewrite_define("define([\"require\"], function () {});", "vs/base/common/event").unwrap(),
            "define(\"vs/base/common/event\", [\"require\"], function () {});"
        );
    }

    #[test]
    fn only_the_first_define_is_rewritten() {
        let source = "/* c */\ndefine([], function () { define(x); });";
        assert_eq!(
            rewrite_define(source, "m").unwrap(),
            "/* c */\ndefine(\"m\", [], function () { define(x); });"
        );
    }

    #[test]
    fn text_after_define_is_kept_verbatim() {
        let source = "define(\n    [\"exports\"],\n    function (exports) {});";
        assert_eq!(
            rewrite_define(source, "m").unwrap(),
            "define(\"m\", \n    [\"exports\"],\n    function (exports) {});"
        );
    }

    #[test]
    fn missing_define_is_none() {
        assert!(rewrite_define("export const x = 1;", "m").is_none());
    }
}
