//! Rule schema definitions.
//!
//! This module defines the declarative rule structure consumed by the
//! compiler. All types derive Serde traits for deserialization from JSON
//! rule documents or construction in memory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single forwarding rule.
///
/// Order within a rule list is semantically significant: the first rule
/// that matches a request wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    /// HTTP method to match, case-insensitive. `"any"` is a wildcard.
    /// Absent defaults to `"get"`.
    pub method: Option<String>,

    /// Path template. Segments of the exact form `${VAR}` become named
    /// parameters, one non-empty path segment each. Absent defaults to `/`.
    pub path: Option<String>,

    /// Upstream origin template, e.g. `https://${UPSTREAM_HOST}`.
    pub origin: String,

    /// Validity filters applied beyond method and path.
    #[serde(default)]
    pub valid: Vec<ValidityFilter>,

    /// Whether the forwarding layer should stream the upstream response.
    pub stream: Option<bool>,

    /// Credential-injection strategy for the upstream call.
    pub auth: Option<AuthConfig>,
}

/// Request validity filter.
///
/// The shape is discriminated once, at deserialization, from which fields
/// are present; match-time code never re-inspects it. Body, body-regex and
/// query filters combine with OR semantics (a matching category
/// short-circuits the rest); header filters combine with AND semantics and
/// are checked unconditionally.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ValidityFilter {
    /// Regex test of the value at a dot-separated body path.
    ///
    /// Listed before [`ValidityFilter::Body`]: the `regex` field is what
    /// disambiguates the two shapes.
    BodyRegex {
        path: String,
        regex: String,
        value: String,
    },

    /// Exact-value test of a dot-separated body path against allowed values.
    Body { path: String, value: Vec<Value> },

    /// Shell-glob test of a query parameter against allowed patterns.
    Query {
        #[serde(rename = "queryParam")]
        query_param: String,
        values: Vec<String>,
    },

    /// Exact-value test of a request header against allowed values.
    Header { header: String, values: Vec<String> },
}

/// Credential-injection strategy. All fields are interpolation templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AuthConfig {
    /// `Authorization: Token <value>`.
    Token { token: String },

    /// `Authorization: Basic <base64(username:password)>`.
    Basic { username: String, password: String },
}
