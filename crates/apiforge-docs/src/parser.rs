//! Documentation block parser.
//!
//! Recognizes these section headers (case-insensitive, alone on a line):
//!
//! | Header | Section |
//! |---|---|
//! | `Args:`, `Arguments:`, `Parameters:` | arguments |
//! | `Returns:`, `Return:` | returns |
//! | `Raises:`, `Throws:` | raises |
//! | `Tags:` | tags |
//!
//! A summary line that would read as a header is written with a leading
//! backslash. Tags holding a comma are written in double quotes.
//!
//! ```text
//! Find pet by ID.
//!
//! Args:
//!     petId (integer): ID of pet to return. Example: 1
//!
//! Returns:
//!     object: The pet.
//!
//! Raises:
//!     HttpError: If the request fails.
//!
//! Tags:
//!     pet
//! ```

use crate::types::{ArgDoc, ParsedDoc, RaiseDoc};
use regex::Regex;
use std::sync::LazyLock;

static ARG_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\))?\s*:(?:\s+(.*)|$)").expect("valid regex")
});
static RAISE_ENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*:(?:\s+(.*)|$)").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Args,
    Returns,
    Raises,
    Tags,
}

fn header_section(line: &str) -> Option<Section> {
    let keyword = line.trim().strip_suffix(':')?.trim_end();
    match keyword.to_ascii_lowercase().as_str() {
        "args" | "arguments" | "parameters" => Some(Section::Args),
        "returns" | "return" => Some(Section::Returns),
        "raises" | "throws" => Some(Section::Raises),
        "tags" => Some(Section::Tags),
        _ => None,
    }
}

/// Returns `true` if a summary line must be written with a leading `\`
/// so it is not read back as a header.
///
/// Lines that already start with the escape are escaped again, so
/// stripping one backslash is always exact.
pub fn needs_escape(line: &str) -> bool {
    let content = line.trim();
    header_section(content).is_some()
        || content
            .strip_prefix('\\')
            .is_some_and(needs_escape)
}

fn unescape_summary(content: &str) -> &str {
    match content.strip_prefix('\\') {
        Some(rest) if needs_escape(rest) => rest,
        _ => content,
    }
}

/// Splits the tag list on commas outside double quotes.
///
/// Quoted tags may hold commas; `\"` and `\\` inside quotes stand for a
/// quote and a backslash.
fn split_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '\\' if quoted => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ',' if !quoted => tags.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    tags.push(current);

    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn fold(target: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Parses one documentation block.
///
/// Never fails: text that fits no section is folded into the nearest
/// entry or ignored, and absent sections stay empty.
///
/// # Examples
///
/// ```
/// use apiforge_docs::parse_doc;
///
/// let doc = parse_doc(
///     "Upload a file.\n\nArgs:\n    name (string): File name\n        on disk.\n\nTags:\n    files, upload",
/// );
///
/// assert_eq!(doc.summary, "Upload a file.");
/// assert_eq!(doc.arg("name").unwrap().description, "File name on disk.");
/// assert_eq!(doc.tags, vec!["files", "upload"]);
/// assert!(doc.returns.is_empty());
/// ```
#[must_use]
pub fn parse_doc(text: &str) -> ParsedDoc {
    let mut doc = ParsedDoc::default();
    let mut section = Section::Summary;
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut tags_text = String::new();
    let mut base_indent: Option<usize> = None;
    let mut current_arg: Option<ArgDoc> = None;
    let mut current_raise: Option<RaiseDoc> = None;

    for line in text.lines() {
        if let Some(next) = header_section(line) {
            flush_arg(&mut doc, &mut current_arg);
            flush_raise(&mut doc, &mut current_raise);
            section = next;
            base_indent = None;
            continue;
        }

        let content = line.trim();
        if content.is_empty() && section != Section::Summary {
            continue;
        }

        let indent = indent_width(line);
        let base = *base_indent.get_or_insert(indent);
        let top_level = indent <= base;

        match section {
            Section::Summary => summary_lines.push(unescape_summary(content)),
            Section::Args => {
                if top_level && let Some(caps) = ARG_ENTRY_REGEX.captures(content) {
                    flush_arg(&mut doc, &mut current_arg);
                    let type_hint = caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|hint| !hint.is_empty());
                    current_arg = Some(ArgDoc {
                        name: caps[1].to_string(),
                        description: caps.get(3).map_or("", |m| m.as_str()).trim().to_string(),
                        type_hint,
                    });
                } else if let Some(arg) = current_arg.as_mut() {
                    fold(&mut arg.description, content);
                }
            }
            Section::Raises => {
                if top_level && let Some(caps) = RAISE_ENTRY_REGEX.captures(content) {
                    flush_raise(&mut doc, &mut current_raise);
                    current_raise = Some(RaiseDoc {
                        kind: caps[1].to_string(),
                        description: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                    });
                } else if let Some(raise) = current_raise.as_mut() {
                    fold(&mut raise.description, content);
                }
            }
            Section::Returns => fold(&mut doc.returns, content),
            Section::Tags => fold(&mut tags_text, content),
        }
    }

    flush_arg(&mut doc, &mut current_arg);
    flush_raise(&mut doc, &mut current_raise);

    doc.summary = summary_lines.join("\n").trim().to_string();
    doc.tags = split_tags(&tags_text);

    doc
}

fn flush_arg(doc: &mut ParsedDoc, current: &mut Option<ArgDoc>) {
    if let Some(arg) = current.take() {
        doc.upsert_arg(arg);
    }
}

fn flush_raise(doc: &mut ParsedDoc, current: &mut Option<RaiseDoc>) {
    if let Some(raise) = current.take() {
        doc.upsert_raise(raise);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_block() {
        let doc = parse_doc("");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_summary_only() {
        let doc = parse_doc("  Lists pets.\n\n  Supports paging.  \n");
        assert_eq!(doc.summary, "Lists pets.\n\nSupports paging.");
        assert!(doc.args.is_empty());
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_args_with_and_without_type_hints() {
        let doc = parse_doc("Args:\n    a: Untyped a\n    b (int): Typed b\n    c (): Empty hint");
        assert_eq!(doc.args.len(), 3);
        assert_eq!(doc.args[0].type_hint, None);
        assert_eq!(doc.args[1].type_hint.as_deref(), Some("int"));
        assert_eq!(doc.args[2].type_hint, None);
        assert_eq!(doc.args[2].description, "Empty hint");
    }

    #[test]
    fn test_continuation_lines_fold_with_single_space() {
        let doc = parse_doc("Args:\n    query (string): First part\n        second   part\n\n        third part\n");
        assert_eq!(
            doc.arg("query").unwrap().description,
            "First part second   part third part"
        );
    }

    #[test]
    fn test_top_level_non_entry_line_folds_into_previous() {
        let doc = parse_doc("Args:\n    name: The name\n    see docs for details");
        assert_eq!(doc.args.len(), 1);
        assert_eq!(doc.args[0].description, "The name see docs for details");
    }

    #[test]
    fn test_indented_colon_line_is_continuation() {
        let doc = parse_doc("Args:\n    limit (integer): Page size.\n        Example: 10");
        assert_eq!(doc.args.len(), 1);
        assert_eq!(doc.args[0].description, "Page size. Example: 10");
    }

    #[test]
    fn test_returns_are_folded() {
        let doc = parse_doc("Returns:\n    object: The created\n        resource.");
        assert_eq!(doc.returns, "object: The created resource.");
    }

    #[test]
    fn test_raises_entries() {
        let doc = parse_doc(
            "Raises:\n    HttpError: If the request\n        fails.\n    DecodeError: If decoding fails.",
        );
        assert_eq!(doc.raises.len(), 2);
        assert_eq!(doc.raise("HttpError").unwrap().description, "If the request fails.");
        assert_eq!(doc.raises[1].kind, "DecodeError");
    }

    #[test]
    fn test_tags_split_trimmed_and_filtered() {
        let doc = parse_doc("Tags:\n    pet, , store ,\n    admin");
        assert_eq!(doc.tags, vec!["pet", "store", "admin"]);
    }

    #[test]
    fn test_header_aliases_case_insensitive() {
        let doc = parse_doc("Summary\nPARAMETERS:\n  x: y\nreturn:\n  z\nThrows:\n  E: e");
        assert_eq!(doc.summary, "Summary");
        assert_eq!(doc.arg("x").unwrap().description, "y");
        assert_eq!(doc.returns, "z");
        assert_eq!(doc.raise("E").unwrap().description, "e");
    }

    #[test]
    fn test_header_with_trailing_text_is_not_a_header() {
        let doc = parse_doc("Returns: nothing interesting\nArgs:\n  a: b");
        assert_eq!(doc.summary, "Returns: nothing interesting");
        assert!(doc.returns.is_empty());
        assert_eq!(doc.args.len(), 1);
    }

    #[test]
    fn test_escaped_header_in_summary() {
        let doc = parse_doc("Lists pets.\n\n\\Returns:\nA page.\n\nReturns:\n    object: pets");
        assert_eq!(doc.summary, "Lists pets.\n\nReturns:\nA page.");
        assert_eq!(doc.returns, "object: pets");

        let doc = parse_doc("\\\\Tags:\n\\not escaped");
        assert_eq!(doc.summary, "\\Tags:\n\\not escaped");
    }

    #[test]
    fn test_quoted_tags_keep_commas() {
        let doc = parse_doc("Tags:\n    \"pets, cats\", store, \"say \\\"hi\\\"\"");
        assert_eq!(doc.tags, vec!["pets, cats", "store", "say \"hi\""]);
    }

    #[test]
    fn test_duplicate_arg_replaces_description() {
        let doc = parse_doc("Args:\n  a: first\n  b: middle\n  a: second");
        assert_eq!(doc.args.len(), 2);
        assert_eq!(doc.args[0].name, "a");
        assert_eq!(doc.args[0].description, "second");
    }

    #[test]
    fn test_entry_without_description() {
        let doc = parse_doc("Args:\n    flag (boolean):\n        Enables it.");
        assert_eq!(doc.arg("flag").unwrap().description, "Enables it.");
    }
}
