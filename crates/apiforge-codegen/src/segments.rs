//! Segment partitioning.
//!
//! Splits a client's methods into topic segments keyed by the first
//! meaningful path segment. Works on the IR only: every method carries its
//! [`PathMarker`](crate::PathMarker), so no emitted text is parsed back.
//!
//! # Examples
//!
//! ```
//! use apiforge_codegen::segments::group_key;
//!
//! assert_eq!(group_key("/api/v2/users/{id}").as_deref(), Some("users"));
//! assert_eq!(group_key("/1.1/store/order").as_deref(), Some("store"));
//! assert_eq!(group_key("/{tenant}/users"), None);
//! assert_eq!(group_key("/"), None);
//! ```

use crate::ir::{GeneratedClient, GeneratedMethod};
use crate::naming::{NameAllocator, sanitize_identifier, to_snake_case};
use crate::typescript::to_pascal_case;
use apiforge_core::Result;
use regex::Regex;
use std::sync::LazyLock;

static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[vV]?\d+(\.\d+)*$").expect("valid regex"));

/// Methods sharing one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Group key, also the file stem under `segments/`
    pub group_key: String,
    /// Segment class name, e.g. `PetSegment`
    pub class_name: String,
    /// Field on the root client holding the segment
    pub field: String,
    /// Methods in client order
    pub methods: Vec<GeneratedMethod>,
}

/// Result of partitioning a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Segments ordered by first appearance
    pub segments: Vec<Segment>,
    /// Methods with no group key
    pub root: Vec<GeneratedMethod>,
}

impl Partition {
    /// Total number of methods across segments and root.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.root.len() + self.segments.iter().map(|s| s.methods.len()).sum::<usize>()
    }

    /// All method names, segments first, then root.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|segment| &segment.methods)
            .chain(&self.root)
            .map(|method| method.name.as_str())
    }
}

/// Computes the group key of a path template.
///
/// Drops a leading `api` and then a leading version segment; the next
/// segment is the key unless it is a `{placeholder}`.
#[must_use]
pub fn group_key(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty()).peekable();

    if segments.peek().is_some_and(|s| s.eq_ignore_ascii_case("api")) {
        segments.next();
    }
    if segments.peek().is_some_and(|s| VERSION_SEGMENT.is_match(s)) {
        segments.next();
    }

    let first = segments.next()?;
    if first.starts_with('{') {
        return None;
    }
    let key = to_snake_case(first);
    (!key.is_empty()).then_some(key)
}

/// Partitions a client's methods into segments and root methods.
///
/// Every method lands in exactly one place.
///
/// # Errors
///
/// Returns [`apiforge_core::Error::NameCollision`] if no free field name is
/// left for a segment.
pub fn partition(client: &GeneratedClient) -> Result<Partition> {
    let mut partition = Partition::default();

    for method in &client.methods {
        let key = method
            .path_marker
            .as_ref()
            .and_then(|marker| group_key(&marker.path));

        let Some(key) = key else {
            partition.root.push(method.clone());
            continue;
        };

        match partition.segments.iter_mut().find(|s| s.group_key == key) {
            Some(segment) => segment.methods.push(method.clone()),
            None => partition.segments.push(Segment {
                class_name: format!("{}Segment", to_pascal_case(&key)),
                field: String::new(),
                group_key: key,
                methods: vec![method.clone()],
            }),
        }
    }

    // Segment fields share the root class namespace with root methods.
    let mut names = NameAllocator::for_methods();
    for method in &partition.root {
        names.claim_with_tiebreak(&method.name)?;
    }
    for segment in &mut partition.segments {
        segment.field = names.claim_with_tiebreak(&sanitize_identifier(&segment.group_key))?;
    }

    tracing::debug!(
        segments = partition.segments.len(),
        root_methods = partition.root.len(),
        "Partitioned client"
    );

    Ok(partition)
}
