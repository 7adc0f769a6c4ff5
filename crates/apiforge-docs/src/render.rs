//! Renders a [`ParsedDoc`] back into block text.

use crate::parser::needs_escape;
use crate::types::ParsedDoc;

/// Column limit for wrapped entries.
pub const WRAP_WIDTH: usize = 88;

const ENTRY_INDENT: &str = "    ";
const CONTINUATION_INDENT: &str = "        ";

/// Renders a documentation block that [`parse_doc`](crate::parse_doc) reads
/// back into an equal value.
///
/// Sections are separated by one blank line and empty sections are omitted.
/// Entries are indented four spaces; long descriptions wrap at
/// [`WRAP_WIDTH`] columns with eight-space continuation lines.
///
/// # Examples
///
/// ```
/// use apiforge_docs::{ArgDoc, ParsedDoc, parse_doc, render_doc};
///
/// let doc = ParsedDoc {
///     summary: "Delete a pet.".to_string(),
///     args: vec![ArgDoc::new("petId", "Pet to delete.").with_type_hint("integer")],
///     ..ParsedDoc::default()
/// };
///
/// let text = render_doc(&doc);
/// assert_eq!(text, "Delete a pet.\n\nArgs:\n    petId (integer): Pet to delete.");
/// assert_eq!(parse_doc(&text), doc);
/// ```
#[must_use]
pub fn render_doc(doc: &ParsedDoc) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !doc.summary.is_empty() {
        sections.push(escape_summary(&doc.summary));
    }

    if !doc.args.is_empty() {
        let mut lines = vec!["Args:".to_string()];
        for arg in &doc.args {
            let head = match arg.type_hint.as_deref() {
                Some(hint) => format!("{}{} ({hint}):", ENTRY_INDENT, arg.name),
                None => format!("{}{}:", ENTRY_INDENT, arg.name),
            };
            lines.extend(wrap_entry(&head, &arg.description));
        }
        sections.push(lines.join("\n"));
    }

    if !doc.returns.is_empty() {
        let mut lines = vec!["Returns:".to_string()];
        lines.extend(wrap_entry(ENTRY_INDENT, &doc.returns));
        sections.push(lines.join("\n"));
    }

    if !doc.raises.is_empty() {
        let mut lines = vec!["Raises:".to_string()];
        for raise in &doc.raises {
            let head = format!("{}{}:", ENTRY_INDENT, raise.kind);
            lines.extend(wrap_entry(&head, &raise.description));
        }
        sections.push(lines.join("\n"));
    }

    if !doc.tags.is_empty() {
        let tags: Vec<String> = doc.tags.iter().map(|tag| quote_tag(tag)).collect();
        sections.push(format!("Tags:\n{ENTRY_INDENT}{}", tags.join(", ")));
    }

    sections.join("\n\n")
}

fn escape_summary(summary: &str) -> String {
    summary
        .lines()
        .map(|line| {
            if needs_escape(line) {
                let indent = &line[..line.len() - line.trim_start().len()];
                format!("{indent}\\{}", line.trim_start())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_tag(tag: &str) -> String {
    if tag.contains([',', '"']) {
        format!("\"{}\"", tag.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        tag.to_string()
    }
}

/// Wraps `text` after `head`, filling each line up to [`WRAP_WIDTH`].
///
/// The first word always stays on the head line, so no word is ever split.
fn wrap_entry(head: &str, text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = head.to_string();
    let mut line_has_word = false;

    for word in text.split_whitespace() {
        let separator = usize::from(!current.ends_with(' '));
        if !line_has_word || current.len() + separator + word.len() <= WRAP_WIDTH {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(current);
            current = format!("{CONTINUATION_INDENT}{word}");
        }
        line_has_word = true;
    }

    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArgDoc, RaiseDoc};

    #[test]
    fn test_empty_doc_renders_empty() {
        assert_eq!(render_doc(&ParsedDoc::default()), "");
    }

    #[test]
    fn test_section_layout() {
        let doc = ParsedDoc {
            summary: "Summary.".to_string(),
            args: vec![ArgDoc::new("a", "First.")],
            returns: "object: Result.".to_string(),
            raises: vec![RaiseDoc::new("HttpError", "Transport failure.")],
            tags: vec!["pet".to_string(), "store".to_string()],
        };

        assert_eq!(
            render_doc(&doc),
            "Summary.\n\nArgs:\n    a: First.\n\nReturns:\n    object: Result.\n\n\
             Raises:\n    HttpError: Transport failure.\n\nTags:\n    pet, store"
        );
    }

    #[test]
    fn test_header_lines_in_summary_are_escaped() {
        let doc = ParsedDoc {
            summary: "Lists pets.\n\nReturns:\nA page of pets.".to_string(),
            returns: "object: pets".to_string(),
            ..ParsedDoc::default()
        };
        assert_eq!(
            render_doc(&doc),
            "Lists pets.\n\n\\Returns:\nA page of pets.\n\nReturns:\n    object: pets"
        );
    }

    #[test]
    fn test_tags_with_commas_are_quoted() {
        let doc = ParsedDoc {
            tags: vec!["pets, cats".to_string(), "store".to_string()],
            ..ParsedDoc::default()
        };
        assert_eq!(render_doc(&doc), "Tags:\n    \"pets, cats\", store");
    }

    #[test]
    fn test_long_description_wraps() {
        let description = "word ".repeat(40);
        let doc = ParsedDoc {
            args: vec![ArgDoc::new("name", description.trim())],
            ..ParsedDoc::default()
        };

        let text = render_doc(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() > 2);
        assert!(lines.iter().all(|line| line.len() <= WRAP_WIDTH));
        assert!(lines[2].starts_with(CONTINUATION_INDENT));
    }

    #[test]
    fn test_overlong_word_is_not_split() {
        let word = "x".repeat(120);
        let lines = wrap_entry("    name:", &word);
        assert_eq!(lines, vec![format!("    name: {word}")]);
    }

    #[test]
    fn test_entry_without_description() {
        let lines = wrap_entry("    flag (boolean):", "");
        assert_eq!(lines, vec!["    flag (boolean):".to_string()]);
    }

    #[test]
    fn test_returns_wraps_from_entry_indent() {
        let doc = ParsedDoc {
            returns: "long ".repeat(30).trim().to_string(),
            ..ParsedDoc::default()
        };
        let text = render_doc(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Returns:");
        assert!(lines[1].starts_with("    long"));
        assert!(!lines[1].starts_with(CONTINUATION_INDENT));
        assert!(lines[2].starts_with(CONTINUATION_INDENT));
    }
}
