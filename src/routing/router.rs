//! Request dispatch.
//!
//! # Responsibilities
//! - Run compiled rules in declaration order; first match wins
//! - Enforce the directory-traversal guard
//! - Produce the forwarding directive consumed by the transport layer
//! - Publish replacement rule sets atomically (SharedRouter)
//!
//! # Design Decisions
//! - Router is immutable after construction: lock-free concurrent readers
//! - A request no rule matches is a distinct Blocked rejection, never a fault
//! - Reload swaps the whole compiled artifact; no in-place mutation

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::routing::compiler::CompiledRule;

/// Inbound request as seen by the matching core. The transport adapter
/// fills this in; `url` is the raw request target (path, query, fragment).
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

/// Forwarding directive for a matched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Fully rewritten target URL (origin + path + query).
    pub url: String,
    /// Computed Authorization header value, when the rule declares auth.
    pub auth: Option<String>,
    /// Streaming flag, passed through from the rule.
    pub stream: Option<bool>,
}

/// Match failure surfaced to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// No rule matched. An expected rejection, not a system fault.
    #[error("request blocked: no rule matched {method} {url}")]
    Blocked { method: String, url: String },
}

/// Immutable dispatcher over an ordered compiled-rule list.
#[derive(Debug, Default)]
pub struct Router {
    rules: Vec<CompiledRule>,
}

impl Router {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        Self { rules }
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Match a request against the rules in declaration order. The first
    /// matching rule produces the result; no rule means Blocked.
    pub fn match_request(&self, request: &Request) -> Result<MatchResult, MatchError> {
        // Traversal guard: a URL whose lexical normalization differs from
        // its raw form never matches any rule.
        if normalize_url(&request.url) != request.url {
            tracing::debug!(url = %request.url, "Rejecting non-normalized URL");
            return Err(blocked(request));
        }
        for rule in &self.rules {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                rule_method = %rule.method,
                origin = %rule.origin,
                "Trying rule"
            );
            if let Some(result) = try_rule(rule, request) {
                tracing::debug!(url = %result.url, "Request matched");
                return Ok(result);
            }
        }
        Err(blocked(request))
    }
}

fn blocked(request: &Request) -> MatchError {
    MatchError::Blocked {
        method: request.method.clone(),
        url: request.url.clone(),
    }
}

fn try_rule(rule: &CompiledRule, request: &Request) -> Option<MatchResult> {
    if rule.method != "any" && !request.method.eq_ignore_ascii_case(&rule.method) {
        return None;
    }

    // Drop any fragment, then split at the first `?`: later `?` characters
    // belong to the querystring.
    let target = request.url.split('#').next().unwrap_or("");
    let (path, querystring) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    let captures = rule.template.captures(path)?;
    let rewritten = rule.template.rewrite(&captures, &rule.param_defaults);

    if rule.filters.has_content_filters()
        && !rule.filters.is_valid(request.body.as_deref(), querystring)
    {
        return None;
    }
    if rule.filters.has_header_filters() && !rule.filters.headers_valid(&request.headers) {
        return None;
    }

    let url = if querystring.is_empty() {
        format!("{}{}", rule.origin, rewritten)
    } else {
        format!("{}{}?{}", rule.origin, rewritten, querystring)
    };
    Some(MatchResult {
        url,
        auth: rule.auth.clone(),
        stream: rule.stream,
    })
}

/// POSIX-style lexical normalization mirroring `path.normalize` semantics:
/// duplicate slashes collapse, `.` segments drop, `..` segments resolve.
fn normalize_url(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let trailing = raw.len() > 1 && raw.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let mut normalized = if absolute {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    };
    if normalized.is_empty() {
        normalized = ".".to_string();
    }
    if trailing && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Shared handle over the current compiled artifact.
///
/// Readers are lock-free; `store` atomically publishes a full replacement,
/// so no in-flight match ever observes a partially updated rule set.
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the current router.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Atomically replace the compiled rule set.
    pub fn store(&self, router: Router) {
        self.current.store(Arc::new(router));
    }

    /// Match against the current snapshot.
    pub fn match_request(&self, request: &Request) -> Result<MatchResult, MatchError> {
        self.current.load().match_request(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_identity() {
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url("/pkg/left-pad"), "/pkg/left-pad");
        assert_eq!(normalize_url("/pkg/left-pad?x=1"), "/pkg/left-pad?x=1");
        assert_eq!(normalize_url("/a/b/"), "/a/b/");
    }

    #[test]
    fn test_normalize_url_resolves_traversal() {
        assert_eq!(normalize_url("/a/../b"), "/b");
        assert_eq!(normalize_url("/a/./b"), "/a/b");
        assert_eq!(normalize_url("/a//b"), "/a/b");
        assert_eq!(normalize_url("/.."), "/");
    }

    #[test]
    fn test_empty_router_blocks_everything() {
        let router = Router::default();
        let request = Request {
            method: "GET".to_string(),
            url: "/".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            router.match_request(&request),
            Err(MatchError::Blocked { .. })
        ));
    }

    #[test]
    fn test_blocked_error_names_request() {
        let router = Router::default();
        let request = Request {
            method: "POST".to_string(),
            url: "/pkg".to_string(),
            ..Default::default()
        };
        let err = router.match_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "request blocked: no rule matched POST /pkg");
    }
}
