//! Validity-filter evaluation.
//!
//! # Responsibilities
//! - Partition a rule's declared filters into the four shapes
//! - Evaluate body / body-regex / query filters (OR, category short-circuit)
//! - Evaluate header filters (AND, unconditional)
//!
//! # Design Decisions
//! - Body parse failure degrades to an empty structure, never an error
//! - Regex text is data: compiled per evaluation, malformed patterns are
//!   logged and treated as non-matching for that filter only
//! - Header filters use AND semantics, the other categories OR; the
//!   polarity split is intentional and load-bearing

use std::collections::HashMap;

use globset::Glob;
use regex::Regex;
use serde_json::Value;

use crate::config::schema::ValidityFilter;

#[derive(Debug, Clone)]
struct BodyFilter {
    path: String,
    value: Vec<Value>,
}

#[derive(Debug, Clone)]
struct BodyRegexFilter {
    path: String,
    regex: String,
}

#[derive(Debug, Clone)]
struct QueryFilter {
    query_param: String,
    values: Vec<String>,
}

#[derive(Debug, Clone)]
struct HeaderFilter {
    header: String,
    values: Vec<String>,
}

/// One rule's declared filters, partitioned by shape at compile time.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    body: Vec<BodyFilter>,
    body_regex: Vec<BodyRegexFilter>,
    query: Vec<QueryFilter>,
    header: Vec<HeaderFilter>,
}

impl FilterSet {
    /// Partition raw filters into the four buckets. Shapes were fixed at
    /// deserialization and are never re-inspected per request.
    pub fn partition(filters: &[ValidityFilter]) -> Self {
        let mut set = Self::default();
        for filter in filters {
            match filter {
                ValidityFilter::Body { path, value } => set.body.push(BodyFilter {
                    path: path.clone(),
                    value: value.clone(),
                }),
                ValidityFilter::BodyRegex { path, regex, .. } => {
                    set.body_regex.push(BodyRegexFilter {
                        path: path.clone(),
                        regex: regex.clone(),
                    })
                }
                ValidityFilter::Query {
                    query_param,
                    values,
                } => set.query.push(QueryFilter {
                    query_param: query_param.clone(),
                    values: values.clone(),
                }),
                ValidityFilter::Header { header, values } => set.header.push(HeaderFilter {
                    header: header.to_lowercase(),
                    values: values.clone(),
                }),
            }
        }
        set
    }

    /// True when at least one body, body-regex or query filter is declared.
    pub fn has_content_filters(&self) -> bool {
        !(self.body.is_empty() && self.body_regex.is_empty() && self.query.is_empty())
    }

    /// True when at least one header filter is declared.
    pub fn has_header_filters(&self) -> bool {
        !self.header.is_empty()
    }

    /// OR across filters within a category, categories short-circuiting in
    /// body → body-regex → query order. False when every declared category
    /// misses; trivially true when no content filter is declared.
    pub fn is_valid(&self, body: Option<&str>, querystring: &str) -> bool {
        if !self.has_content_filters() {
            return true;
        }
        let parsed = parse_body(body);
        if self.body.iter().any(|filter| {
            lookup(&parsed, &filter.path)
                .is_some_and(|found| filter.value.iter().any(|allowed| allowed == found))
        }) {
            return true;
        }
        if self
            .body_regex
            .iter()
            .any(|filter| regex_matches(filter, &parsed))
        {
            return true;
        }
        if !self.query.is_empty() {
            let params = parse_query(querystring);
            if self.query.iter().any(|filter| {
                let value = params
                    .get(filter.query_param.as_str())
                    .map(String::as_str)
                    .unwrap_or("");
                filter
                    .values
                    .iter()
                    .any(|pattern| glob_matches(pattern, value))
            }) {
                return true;
            }
        }
        false
    }

    /// AND across all header filters: every named header must be present
    /// (case-insensitive name) with exactly one of its allowed values.
    pub fn headers_valid(&self, headers: &HashMap<String, String>) -> bool {
        self.header.iter().all(|filter| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&filter.header))
                .is_some_and(|(_, value)| filter.values.iter().any(|allowed| allowed == value))
        })
    }
}

/// Parse the body as JSON. Absent or malformed bodies degrade to `Null`,
/// against which every path lookup resolves to absent.
fn parse_body(body: Option<&str>) -> Value {
    body.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(Value::Null)
}

/// Safe dot-separated lookup: objects by key, arrays by numeric index.
/// Any missing intermediate step resolves to `None`, never an error.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for step in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(items) => items.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn regex_matches(filter: &BodyRegexFilter, parsed: &Value) -> bool {
    let value = match lookup(parsed, &filter.path) {
        Some(found) => coerce_to_string(found),
        None => return false,
    };
    match Regex::new(&filter.regex) {
        Ok(re) => re.is_match(&value),
        Err(err) => {
            tracing::error!(
                pattern = %filter.regex,
                error = %err,
                "Malformed body-regex filter, treating as non-matching"
            );
            false
        }
    }
}

/// JSON strings compare unquoted; other values use their JSON display form.
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn glob_matches(pattern: &str, value: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(value),
        Err(err) => {
            tracing::debug!(
                pattern = %pattern,
                error = %err,
                "Malformed glob pattern in query filter"
            );
            false
        }
    }
}

/// Parse a raw querystring into a name → value map. First occurrence wins;
/// bracket-style keys are preserved verbatim so filters can name them.
fn parse_query(querystring: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(querystring.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}
