//! Rule compilation.
//!
//! # Data Flow
//! ```text
//! RuleSource (inline list | injected loader | JSON file)
//!     → resolve_rules (fail-closed on loader failure)
//!     → per rule, in order:
//!         normalize method, partition filters,
//!         compile path template + parameter defaults,
//!         interpolate origin, resolve auth
//!     → Vec<CompiledRule> (ordered, immutable)
//! ```
//!
//! # Design Decisions
//! - Input order preserved: first match wins downstream
//! - Loader failure degrades to an empty list (every request then blocked)
//! - A rule document that is not a JSON array is a fatal configuration error

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::config::interpolate::{interpolate, ConfigMap};
use crate::config::loader::RuleSource;
use crate::config::schema::Rule;
use crate::routing::auth;
use crate::routing::filters::FilterSet;
use crate::routing::matcher::PathTemplate;

/// Errors that abort compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The resolved rule document is not an ordered list.
    #[error("rule source must be a list, got {actual}")]
    RuleSourceNotAList { actual: &'static str },

    /// A loaded rule entry does not fit the rule schema.
    #[error("invalid rule definition: {0}")]
    InvalidRule(#[from] serde_json::Error),
}

/// Immutable, pre-processed form of a rule, ready for per-request matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Lowercased method; `"any"` is the wildcard.
    pub(crate) method: String,
    /// Origin with configuration placeholders already substituted.
    pub(crate) origin: String,
    pub(crate) template: PathTemplate,
    /// Parameter name → configured override (empty when unconfigured).
    pub(crate) param_defaults: HashMap<String, String>,
    pub(crate) filters: FilterSet,
    /// Precomputed Authorization header value.
    pub(crate) auth: Option<String>,
    pub(crate) stream: Option<bool>,
}

/// Compile a rule source into an ordered matcher list.
pub fn compile(source: &RuleSource, config: &ConfigMap) -> Result<Vec<CompiledRule>, CompileError> {
    let rules = resolve_rules(source)?;
    tracing::info!(count = rules.len(), "Compiling rules");
    Ok(rules
        .iter()
        .map(|rule| compile_rule(rule, config))
        .collect())
}

/// Resolve the source to a typed rule list. Loader failure is recovered
/// fail-closed; a non-list document is fatal.
fn resolve_rules(source: &RuleSource) -> Result<Vec<Rule>, CompileError> {
    match source {
        RuleSource::Inline(rules) => Ok(rules.clone()),
        RuleSource::Loader(load) => match load() {
            Ok(Value::Array(entries)) => entries
                .into_iter()
                .map(|entry| serde_json::from_value(entry).map_err(CompileError::from))
                .collect(),
            Ok(other) => Err(CompileError::RuleSourceNotAList {
                actual: json_type(&other),
            }),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Rule source unreadable, compiling empty rule list"
                );
                Ok(Vec::new())
            }
        },
    }
}

fn compile_rule(rule: &Rule, config: &ConfigMap) -> CompiledRule {
    // Default before lowercasing: an absent method means "get".
    let method = rule.method.as_deref().unwrap_or("get").to_lowercase();
    let path = rule.path.as_deref().unwrap_or("/");
    let template = PathTemplate::compile(path);
    let param_defaults: HashMap<String, String> = template
        .param_names()
        .map(|name| {
            (
                name.to_string(),
                config.get(name).cloned().unwrap_or_default(),
            )
        })
        .collect();
    let origin = interpolate(&rule.origin, config);
    let filters = FilterSet::partition(&rule.valid);
    let auth = rule.auth.as_ref().map(|a| auth::resolve(a, config));

    tracing::info!(method = %method, path = %path, origin = %origin, "Rule compiled");

    CompiledRule {
        method,
        origin,
        template,
        param_defaults,
        filters,
        auth,
        stream: rule.stream,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::LoadError;
    use serde_json::json;

    fn inline_rule(raw: Value) -> Rule {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_method_defaults_to_get_then_lowercases() {
        let cfg = ConfigMap::new();
        let rules = vec![
            inline_rule(json!({"origin": "https://up.example"})),
            inline_rule(json!({"method": "POST", "origin": "https://up.example"})),
        ];
        let compiled = compile(&RuleSource::Inline(rules), &cfg).unwrap();
        assert_eq!(compiled[0].method, "get");
        assert_eq!(compiled[1].method, "post");
    }

    #[test]
    fn test_origin_is_interpolated() {
        let mut cfg = ConfigMap::new();
        cfg.insert("UPSTREAM".to_string(), "up.example".to_string());
        let rules = vec![inline_rule(json!({"origin": "https://${UPSTREAM}"}))];
        let compiled = compile(&RuleSource::Inline(rules), &cfg).unwrap();
        assert_eq!(compiled[0].origin, "https://up.example");
    }

    #[test]
    fn test_param_defaults_side_table() {
        let mut cfg = ConfigMap::new();
        cfg.insert("NAME".to_string(), "left-pad".to_string());
        let rules = vec![inline_rule(json!({
            "path": "/pkg/${NAME}/${VERSION}",
            "origin": "https://up.example"
        }))];
        let compiled = compile(&RuleSource::Inline(rules), &cfg).unwrap();
        assert_eq!(compiled[0].param_defaults["NAME"], "left-pad");
        // Unconfigured parameters record an empty override.
        assert_eq!(compiled[0].param_defaults["VERSION"], "");
    }

    #[test]
    fn test_order_preserved() {
        let cfg = ConfigMap::new();
        let rules = vec![
            inline_rule(json!({"origin": "https://first.example"})),
            inline_rule(json!({"origin": "https://second.example"})),
        ];
        let compiled = compile(&RuleSource::Inline(rules), &cfg).unwrap();
        assert_eq!(compiled[0].origin, "https://first.example");
        assert_eq!(compiled[1].origin, "https://second.example");
    }

    #[test]
    fn test_loader_failure_compiles_empty() {
        let source = RuleSource::Loader(Box::new(|| {
            Err(LoadError::Loader("registry unreachable".into()))
        }));
        let compiled = compile(&source, &ConfigMap::new()).unwrap();
        assert!(compiled.is_empty());
    }

    #[test]
    fn test_non_list_source_is_fatal() {
        let source = RuleSource::Loader(Box::new(|| Ok(json!({"rules": []}))));
        let err = compile(&source, &ConfigMap::new()).unwrap_err();
        match err {
            CompileError::RuleSourceNotAList { actual } => assert_eq!(actual, "object"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_loader_list_deserializes_rules() {
        let source = RuleSource::Loader(Box::new(|| {
            Ok(json!([
                {"method": "get", "path": "/pkg/${NAME}", "origin": "https://up.example"}
            ]))
        }));
        let compiled = compile(&source, &ConfigMap::new()).unwrap();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].method, "get");
    }

    #[test]
    fn test_auth_resolved_at_compile_time() {
        let mut cfg = ConfigMap::new();
        cfg.insert("API_TOKEN".to_string(), "s3cr3t".to_string());
        let rules = vec![inline_rule(json!({
            "origin": "https://up.example",
            "auth": {"token": "${API_TOKEN}"}
        }))];
        let compiled = compile(&RuleSource::Inline(rules), &cfg).unwrap();
        assert_eq!(compiled[0].auth.as_deref(), Some("Token s3cr3t"));
    }
}
