//! Finding undocumented TypeScript functions.
//!
//! Source is parsed with tree-sitter and only declarations are reported:
//! module-level function declarations and `const`/`let` bindings of
//! function values, plus methods of class bodies. Functions passed as
//! arguments are expressions and never reported.

use crate::error::{DocgenError, Result};
use tree_sitter::{Node, Parser};

/// Lines of source sent to the model per function.
const MAX_CONTEXT_LINES: usize = 60;

/// One function or method without a documentation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSite {
    /// Declared name
    pub name: String,
    /// Zero-based line where the block goes: the first decorator, the
    /// `export` keyword or the declaration itself
    pub line: usize,
    /// Leading whitespace of that line
    pub indent: String,
    /// Declaration and body, truncated for the prompt
    pub source: String,
}

/// Returns every function and method that lacks a `/** */` block, in
/// source order.
///
/// # Errors
///
/// Returns [`DocgenError::Parse`] if the TypeScript grammar cannot be
/// loaded or parsing is aborted. Syntax errors in the source are not
/// errors: declarations outside the broken region are still found.
///
/// # Examples
///
/// ```
/// use apiforge_docgen::find_undocumented;
///
/// let source = "/** Adds. */\nfunction add(a, b) {\n  return a + b;\n}\n\nfunction sub(a, b) {\n  return a - b;\n}\n";
/// let sites = find_undocumented(source)?;
/// assert_eq!(sites.len(), 1);
/// assert_eq!(sites[0].name, "sub");
/// assert_eq!(sites[0].line, 5);
/// # Ok::<(), apiforge_docgen::DocgenError>(())
/// ```
pub fn find_undocumented(source: &str) -> Result<Vec<FunctionSite>> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_typescript::language_typescript())
        .map_err(|e| DocgenError::Parse(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DocgenError::Parse("parser returned no tree".to_string()))?;

    let lines: Vec<&str> = source.lines().collect();
    let mut sites = Vec::new();
    collect(tree.root_node(), source, &lines, &mut sites);
    // `const a = () => 1, b = () => 2;` shares one line and one block.
    sites.dedup_by_key(|site| site.line);
    Ok(sites)
}

fn collect(node: Node<'_>, source: &str, lines: &[&str], sites: &mut Vec<FunctionSite>) {
    if let Some((name, anchor)) = declaration(node, source) {
        let line = anchor.start_position().row;
        if !has_doc_block(lines.get(..line).unwrap_or_default()) {
            let end = node.end_position().row;
            let text = lines.get(line).copied().unwrap_or_default();
            sites.push(FunctionSite {
                name,
                line,
                indent: text[..text.len() - text.trim_start().len()].to_string(),
                source: lines
                    .get(line..=end)
                    .unwrap_or_default()
                    .iter()
                    .take(MAX_CONTEXT_LINES)
                    .copied()
                    .collect::<Vec<_>>()
                    .join("\n"),
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect(child, source, lines, sites);
    }
}

/// Name of the declared function and the node its block attaches to.
fn declaration<'t>(node: Node<'t>, source: &str) -> Option<(String, Node<'t>)> {
    let name = match node.kind() {
        "function_declaration" | "generator_function_declaration" if at_module_level(node) => {
            node.child_by_field_name("name")?
        }
        "lexical_declaration" | "variable_declaration" if at_module_level(node) => {
            let mut cursor = node.walk();
            let declarator = node.named_children(&mut cursor).find(|child| {
                child.kind() == "variable_declarator"
                    && child
                        .child_by_field_name("value")
                        .is_some_and(|value| is_function_value(value.kind()))
            })?;
            declarator.child_by_field_name("name")?
        }
        "method_definition" if node.parent().is_some_and(|parent| parent.kind() == "class_body") => {
            node.child_by_field_name("name")?
        }
        _ => return None,
    };

    let text = source.get(name.start_byte()..name.end_byte())?;
    Some((text.to_string(), first_decorator(exported(node))))
}

fn is_function_value(kind: &str) -> bool {
    matches!(
        kind,
        "arrow_function" | "function" | "function_expression" | "generator_function"
    )
}

fn at_module_level(node: Node<'_>) -> bool {
    match node.parent() {
        Some(parent) if parent.kind() == "program" => true,
        Some(parent) if parent.kind() == "export_statement" => {
            parent.parent().is_some_and(|outer| outer.kind() == "program")
        }
        _ => false,
    }
}

fn exported(node: Node<'_>) -> Node<'_> {
    node.parent()
        .filter(|parent| parent.kind() == "export_statement")
        .unwrap_or(node)
}

/// Decorators parsed as preceding siblings still belong to the member.
fn first_decorator(node: Node<'_>) -> Node<'_> {
    let mut anchor = node;
    while let Some(previous) = anchor.prev_named_sibling() {
        if previous.kind() != "decorator" {
            break;
        }
        anchor = previous;
    }
    anchor
}

/// Looks upward past blank lines and decorators for a closing `*/`.
fn has_doc_block(before: &[&str]) -> bool {
    before
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with('@'))
        .is_some_and(|line| line.ends_with("*/"))
}
