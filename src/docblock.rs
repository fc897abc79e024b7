//! PHP docblock comments.

/// Indent used for class members.
pub const MEMBER_INDENT: &str = "    ";

/// Wrap pre-rendered lines in a `/** ... */` block.
///
/// Every line is prefixed by `indent` and ends with `\n`. Empty lines render
/// as a bare ` *`.
pub fn render_comment<S: AsRef<str>>(lines: &[S], indent: &str) -> String {
    let mut out = String::new();
    out.push_str(indent);
    out.push_str("/**\n");

    for line in lines {
        let line = line.as_ref();
        out.push_str(indent);
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str(indent);
    out.push_str(" */\n");
    out
}
