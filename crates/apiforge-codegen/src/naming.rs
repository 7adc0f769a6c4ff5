//! Method and parameter naming.
//!
//! Method names come from `operationId` (snake_cased) or from the verb and
//! path. Parameter names are sanitized and then claimed from a
//! [`NameAllocator`], which resolves collisions by location suffix and a
//! bounded numeric tiebreak.
//!
//! # Examples
//!
//! ```
//! use apiforge_codegen::naming::{method_name, to_snake_case};
//! use apiforge_core::HttpVerb;
//!
//! assert_eq!(to_snake_case("getPetById"), "get_pet_by_id");
//! assert_eq!(method_name(None, HttpVerb::Get, "/pet/{petId}"), "get_pet_by_pet_id");
//! assert_eq!(method_name(None, HttpVerb::Get, "/"), "root");
//! ```

use crate::typescript::is_reserved_word;
use apiforge_core::{Error, HttpVerb, ParamLocation, Result};
use std::collections::HashSet;

/// Receiver identifiers no parameter may take.
pub const RECEIVER_NAMES: &[&str] = &["this", "self"];

/// Highest numeric tiebreak tried before giving up.
pub const MAX_TIEBREAK: usize = 1000;

/// Method names owned by the generated client class itself.
pub const CLIENT_MEMBER_NAMES: &[&str] = &["constructor", "list_tools", "baseUrl", "headers"];

/// Converts an identifier in any casing to snake_case.
///
/// Splits on non-alphanumerics and case boundaries (an acronym ends before
/// its last capital when a lowercase letter follows). Purely numeric words
/// are dropped.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("getHTTPResponse"), "get_http_response");
/// assert_eq!(to_snake_case("getAPet"), "get_a_pet");
/// assert_eq!(to_snake_case("listV2Items"), "list_v2_items");
/// assert_eq!(to_snake_case("users-2-list"), "users_list");
/// ```
#[must_use]
pub fn to_snake_case(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for chunk in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit() && !current.chars().all(|d| d.is_ascii_digit())
                    || prev.is_ascii_uppercase() && next_is_lower;
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c.to_ascii_lowercase());
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
        .into_iter()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join("_")
}

/// Derives a method name from the operation identifier, or from the verb and
/// path when there is none.
///
/// Path placeholders `{param}` become `by_<param>`; the root path is `root`.
#[must_use]
pub fn method_name(operation_id: Option<&str>, verb: HttpVerb, path: &str) -> String {
    if let Some(id) = operation_id {
        let name = to_snake_case(id);
        if !name.is_empty() {
            return sanitize_identifier(&name);
        }
    }

    let segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => format!("by_{}", to_snake_case(param)),
            None => to_snake_case(segment),
        })
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        return "root".to_string();
    }

    sanitize_identifier(&format!("{}_{}", verb.as_str(), segments.join("_")))
}

/// Turns arbitrary text into a valid identifier, keeping its casing.
///
/// Invalid characters become `_`, outer underscores are trimmed, a leading
/// digit gets a `p_` prefix and reserved words get a `_` suffix. Receiver
/// names pass through unchanged so the allocator can suffix them by
/// location.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::naming::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("pet-id"), "pet_id");
/// assert_eq!(sanitize_identifier("2fa"), "p_2fa");
/// assert_eq!(sanitize_identifier("delete"), "delete_");
/// assert_eq!(sanitize_identifier("petId"), "petId");
/// assert_eq!(sanitize_identifier("this"), "this");
/// ```
#[must_use]
pub fn sanitize_identifier(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let trimmed = replaced.trim_matches('_');

    let mut name = if trimmed.is_empty() {
        "param".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("p_{trimmed}")
    } else {
        trimmed.to_string()
    };

    if !RECEIVER_NAMES.contains(&name.as_str()) && is_reserved_word(&name) {
        name.push('_');
    }
    name
}

/// Hands out unique identifiers within one scope.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::naming::NameAllocator;
/// use apiforge_core::ParamLocation;
///
/// let mut names = NameAllocator::for_parameters();
/// assert_eq!(names.claim("id", ParamLocation::Path).unwrap(), "id");
/// assert_eq!(names.claim("id", ParamLocation::Query).unwrap(), "id_query");
/// assert_eq!(names.claim("id", ParamLocation::Query).unwrap(), "id_query_2");
/// assert_eq!(names.claim("this", ParamLocation::Path).unwrap(), "this_path");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Creates an allocator with nothing reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator for one method's parameters, with the receiver
    /// identifiers reserved.
    #[must_use]
    pub fn for_parameters() -> Self {
        Self::with_reserved(RECEIVER_NAMES)
    }

    /// Creates an allocator for a client's method names, with the class's
    /// own members reserved.
    #[must_use]
    pub fn for_methods() -> Self {
        Self::with_reserved(CLIENT_MEMBER_NAMES)
    }

    fn with_reserved(names: &[&str]) -> Self {
        Self {
            taken: names.iter().map(ToString::to_string).collect(),
        }
    }

    /// Returns `true` if `name` is already claimed or reserved.
    #[must_use]
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claims `base` for a parameter at `location`.
    ///
    /// A taken name gets the location suffix (`_path`, `_query`, `_body`),
    /// then a numeric tiebreak on top of it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameCollision`] when every tiebreak up to
    /// [`MAX_TIEBREAK`] is taken.
    pub fn claim(&mut self, base: &str, location: ParamLocation) -> Result<String> {
        if !self.is_taken(base) {
            return Ok(self.take(base.to_string()));
        }
        let suffixed = format!("{base}{}", location.collision_suffix());
        self.claim_with_tiebreak(&suffixed)
    }

    /// Claims `base`, falling back to `base_2`, `base_3`, and so on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameCollision`] when the tiebreak range is exhausted.
    pub fn claim_with_tiebreak(&mut self, base: &str) -> Result<String> {
        if !self.is_taken(base) {
            return Ok(self.take(base.to_string()));
        }
        for n in 2..=MAX_TIEBREAK {
            let candidate = format!("{base}_{n}");
            if !self.is_taken(&candidate) {
                return Ok(self.take(candidate));
            }
        }
        Err(Error::NameCollision {
            name: base.to_string(),
            attempts: MAX_TIEBREAK,
        })
    }

    fn take(&mut self, name: String) -> String {
        self.taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_from_operation_ids() {
        assert_eq!(to_snake_case("getPetById"), "get_pet_by_id");
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("list_users"), "list_users");
        assert_eq!(to_snake_case("Users.Get"), "users_get");
        assert_eq!(to_snake_case("createAnOrder"), "create_an_order");
        assert_eq!(to_snake_case("getV1Status"), "get_v1_status");
        assert_eq!(to_snake_case("get2FACodes"), "get2_fa_codes");
        assert_eq!(to_snake_case("123"), "");
    }

    #[test]
    fn test_method_name_from_path() {
        assert_eq!(method_name(None, HttpVerb::Post, "/user/createWithList"), "post_user_create_with_list");
        assert_eq!(method_name(None, HttpVerb::Delete, "/store/order/{orderId}"), "delete_store_order_by_order_id");
        assert_eq!(method_name(Some("123"), HttpVerb::Get, "/items"), "get_items");
        assert_eq!(method_name(None, HttpVerb::Get, ""), "root");
    }

    #[test]
    fn test_method_name_prefers_operation_id() {
        assert_eq!(method_name(Some("getPetById"), HttpVerb::Get, "/pet/{petId}"), "get_pet_by_id");
        assert_eq!(method_name(Some("delete"), HttpVerb::Delete, "/x"), "delete_");
    }

    #[test]
    fn test_sanitize_edge_cases() {
        assert_eq!(sanitize_identifier("__x__"), "x");
        assert_eq!(sanitize_identifier("a.b[c]"), "a_b_c");
        assert_eq!(sanitize_identifier("---"), "param");
        assert_eq!(sanitize_identifier("self"), "self");
    }

    #[test]
    fn test_receiver_names_are_reserved() {
        let mut names = NameAllocator::for_parameters();
        assert_eq!(names.claim("self", ParamLocation::Query).unwrap(), "self_query");
        assert_eq!(names.claim("this", ParamLocation::Body).unwrap(), "this_body");
    }

    #[test]
    fn test_body_collides_with_path_and_query() {
        let mut names = NameAllocator::for_parameters();
        names.claim("name", ParamLocation::Path).unwrap();
        names.claim("name", ParamLocation::Query).unwrap();
        assert_eq!(names.claim("name", ParamLocation::Body).unwrap(), "name_body");
        assert_eq!(names.claim("name_body", ParamLocation::Body).unwrap(), "name_body_body");
    }

    #[test]
    fn test_suffixed_name_already_present() {
        let mut names = NameAllocator::for_parameters();
        names.claim("id_query", ParamLocation::Query).unwrap();
        names.claim("id", ParamLocation::Path).unwrap();
        assert_eq!(names.claim("id", ParamLocation::Query).unwrap(), "id_query_2");
    }

    #[test]
    fn test_tiebreak_exhaustion_is_an_error() {
        let mut names = NameAllocator::new();
        names.claim_with_tiebreak("x").unwrap();
        for _ in 2..=MAX_TIEBREAK {
            names.claim_with_tiebreak("x").unwrap();
        }
        let err = names.claim_with_tiebreak("x").unwrap_err();
        assert!(err.is_name_collision());
    }

    #[test]
    fn test_method_allocator_reserves_client_members() {
        let mut names = NameAllocator::for_methods();
        assert_eq!(names.claim_with_tiebreak("list_tools").unwrap(), "list_tools_2");
        assert_eq!(names.claim_with_tiebreak("get_pet").unwrap(), "get_pet");
        assert_eq!(names.claim_with_tiebreak("get_pet").unwrap(), "get_pet_2");
    }
}
