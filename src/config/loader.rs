//! Rule-source loading.
//!
//! # Responsibilities
//! - Represent where rules come from (inline list, injected loader, file)
//! - Surface load failures so compilation can fail closed
//!
//! # Design Decisions
//! - Rule provenance is a caller-supplied dependency, never a runtime
//!   code-load operation
//! - Loaders return raw JSON; the compiler checks the document shape

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::Rule;

/// Error type for rule-source resolution.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the rule source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The rule document is not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An injected loader failed for its own reasons.
    #[error("Loader error: {0}")]
    Loader(String),
}

/// Where compiled rules come from.
pub enum RuleSource {
    /// Rules supplied directly by the caller.
    Inline(Vec<Rule>),

    /// Injected loader returning the raw rule document, or failing.
    Loader(Box<dyn Fn() -> Result<Value, LoadError> + Send + Sync>),
}

impl RuleSource {
    /// Rule source backed by a JSON file on disk.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::Loader(Box::new(move || {
            let content = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&content)?)
        }))
    }
}

impl fmt::Debug for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(rules) => f.debug_tuple("Inline").field(&rules.len()).finish(),
            Self::Loader(_) => f.debug_struct("Loader").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_reports_missing_file() {
        let source = RuleSource::file("/nonexistent/rules.json");
        let RuleSource::Loader(load) = source else {
            panic!("file() must produce a loader");
        };
        assert!(matches!(load(), Err(LoadError::Io(_))));
    }

    #[test]
    fn test_file_source_reads_json() {
        let dir = std::env::temp_dir().join("request-filter-loader-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rules.json");
        fs::write(&path, r#"[{"origin": "https://up.example"}]"#).unwrap();

        let RuleSource::Loader(load) = RuleSource::file(&path) else {
            panic!("file() must produce a loader");
        };
        let value = load().unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_error_display() {
        let err = LoadError::Loader("registry unreachable".into());
        assert_eq!(err.to_string(), "Loader error: registry unreachable");
    }
}
