//! Strong domain types shared across the workspace.
//!
//! # Examples
//!
//! ```
//! use apiforge_core::{HttpVerb, ParamLocation};
//!
//! let verb: HttpVerb = "get".parse().unwrap();
//! assert_eq!(verb.as_upper(), "GET");
//! assert_eq!(ParamLocation::Query.as_str(), "query");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verb of an API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpVerb {
    /// All verbs an OpenAPI path item may declare.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase form, as used for OpenAPI path item keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Uppercase form, as sent on the wire.
    #[must_use]
    pub const fn as_upper(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Whether requests with this verb conventionally carry a body.
    #[must_use]
    pub const fn allows_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_upper())
    }
}

impl FromStr for HttpVerb {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::InvalidArgument(format!("unknown HTTP verb: '{s}'")))
    }
}

/// Where a parameter travels in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into the path template
    Path,
    /// Sent as a query-string pair
    Query,
    /// Part of the request body
    Body,
}

impl ParamLocation {
    /// Lowercase name of the location.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }

    /// Suffix appended to a colliding identifier from this location.
    #[must_use]
    pub const fn collision_suffix(&self) -> &'static str {
        match self {
            Self::Path => "_path",
            Self::Query => "_query",
            Self::Body => "_body",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a decoded response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    /// JSON array
    List,
    /// JSON object
    Map,
    /// Anything else, or undeclared
    #[default]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parsing_is_case_insensitive() {
        assert_eq!("GET".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("patch".parse::<HttpVerb>().unwrap(), HttpVerb::Patch);
        assert!("parameters".parse::<HttpVerb>().is_err());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(HttpVerb::Delete.to_string(), "DELETE");
        assert!(HttpVerb::Post.allows_body());
        assert!(!HttpVerb::Get.allows_body());
    }

    #[test]
    fn test_collision_suffixes() {
        assert_eq!(ParamLocation::Query.collision_suffix(), "_query");
        assert_eq!(ParamLocation::Body.collision_suffix(), "_body");
    }

    #[test]
    fn test_return_kind_serde() {
        let json = serde_json::to_string(&ReturnKind::List).unwrap();
        assert_eq!(json, "\"list\"");
        assert_eq!(ReturnKind::default(), ReturnKind::Unknown);
    }
}
