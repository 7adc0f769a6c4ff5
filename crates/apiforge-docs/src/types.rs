//! Parsed documentation block types.

use serde::{Deserialize, Serialize};

/// A documentation block split into its sections.
///
/// Produced by [`parse_doc`](crate::parse_doc) and consumed by
/// [`render_doc`](crate::render_doc). Missing sections are empty, never
/// absent.
///
/// # Examples
///
/// ```
/// use apiforge_docs::parse_doc;
///
/// let doc = parse_doc("Fetch a pet.\n\nArgs:\n    petId (integer): Pet id.");
/// assert_eq!(doc.summary, "Fetch a pet.");
/// assert_eq!(doc.arg("petId").unwrap().type_hint.as_deref(), Some("integer"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDoc {
    /// Free text before the first section header.
    pub summary: String,

    /// Argument entries in declaration order.
    pub args: Vec<ArgDoc>,

    /// Folded returns text.
    pub returns: String,

    /// Failure entries in declaration order.
    pub raises: Vec<RaiseDoc>,

    /// Classification tags.
    pub tags: Vec<String>,
}

impl ParsedDoc {
    /// Looks up an argument entry by name.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&ArgDoc> {
        self.args.iter().find(|arg| arg.name == name)
    }

    /// Looks up a raises entry by exception kind.
    #[must_use]
    pub fn raise(&self, kind: &str) -> Option<&RaiseDoc> {
        self.raises.iter().find(|raise| raise.kind == kind)
    }

    /// Returns `true` when every section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.args.is_empty()
            && self.returns.is_empty()
            && self.raises.is_empty()
            && self.tags.is_empty()
    }

    /// Inserts or replaces an argument entry, keeping first-seen order.
    pub fn upsert_arg(&mut self, arg: ArgDoc) {
        match self.args.iter_mut().find(|existing| existing.name == arg.name) {
            Some(existing) => *existing = arg,
            None => self.args.push(arg),
        }
    }

    /// Inserts or replaces a raises entry, keeping first-seen order.
    pub fn upsert_raise(&mut self, raise: RaiseDoc) {
        match self
            .raises
            .iter_mut()
            .find(|existing| existing.kind == raise.kind)
        {
            Some(existing) => *existing = raise,
            None => self.raises.push(raise),
        }
    }
}

/// One `Args:` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgDoc {
    /// Parameter identifier.
    pub name: String,

    /// Folded description.
    pub description: String,

    /// Free-text type from the parenthesized hint, e.g. `list of strings`.
    pub type_hint: Option<String>,
}

impl ArgDoc {
    /// Creates an entry without a type hint.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            type_hint: None,
        }
    }

    /// Sets the type hint.
    #[must_use]
    pub fn with_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }
}

/// One `Raises:` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseDoc {
    /// Exception or error kind.
    pub kind: String,

    /// Folded description.
    pub description: String,
}

impl RaiseDoc {
    /// Creates a raises entry.
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
        }
    }
}
