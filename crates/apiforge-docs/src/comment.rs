//! Conversion between documentation blocks and `/** ... */` comments.

/// Wraps block text in a `/** ... */` comment indented by `indent`.
///
/// # Examples
///
/// ```
/// use apiforge_docs::to_block_comment;
///
/// let comment = to_block_comment("Summary.\n\nArgs:\n    a: A.", "  ");
/// assert_eq!(comment, "  /**\n   * Summary.\n   *\n   * Args:\n   *     a: A.\n   */");
/// ```
#[must_use]
pub fn to_block_comment(text: &str, indent: &str) -> String {
    let mut out = format!("{indent}/**\n");
    for line in text.lines() {
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */"));
    out
}

/// Recovers block text from a `/** ... */` comment.
///
/// Leading `*` gutters and one following space are removed; deeper
/// indentation inside the block is kept.
#[must_use]
pub fn strip_block_comment(comment: &str) -> String {
    let body = comment.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();

    lines.join("\n").trim_matches('\n').to_string()
}
