//! Path-template matching.
//!
//! # Responsibilities
//! - Compile a rule path into literal and named-parameter segments
//! - Capture parameter values from an incoming path
//! - Rebuild the outgoing path with configured overrides applied
//!
//! # Design Decisions
//! - A named parameter matches exactly one non-empty path segment
//! - Literal segments compare verbatim (case-sensitive)
//! - Compiled once at rule-compilation time, immutable afterwards

use std::collections::HashMap;

/// One compiled template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parameter captured from a request path, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub value: String,
}

/// Compiled path template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a rule path. A leading slash is enforced (prepended when
    /// missing); a segment of the exact form `${VAR}` becomes the named
    /// parameter `VAR`, everything else is a literal.
    pub fn compile(path: &str) -> Self {
        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let segments = normalized[1..]
            .split('/')
            .map(|segment| match param_name(segment) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Names of the declared parameters, in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path` against the template. Returns the captured parameters
    /// in declaration order, or `None` on mismatch.
    pub fn captures(&self, path: &str) -> Option<Vec<Capture>> {
        if !path.starts_with('/') {
            return None;
        }
        let given: Vec<&str> = path[1..].split('/').collect();
        if given.len() != self.segments.len() {
            return None;
        }
        let mut captures = Vec::new();
        for (segment, value) in self.segments.iter().zip(given.iter()) {
            match segment {
                Segment::Literal(literal) => {
                    if literal.as_str() != *value {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if value.is_empty() {
                        return None;
                    }
                    captures.push(Capture {
                        name: name.clone(),
                        value: (*value).to_string(),
                    });
                }
            }
        }
        Some(captures)
    }

    /// Rebuild the path, substituting each parameter with its configured
    /// override when one is set and non-empty, else with its captured value.
    pub fn rewrite(&self, captures: &[Capture], overrides: &HashMap<String, String>) -> String {
        let mut remaining = captures.iter();
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Param(name) => {
                    let captured = remaining.next().map(|c| c.value.as_str()).unwrap_or("");
                    match overrides.get(name) {
                        Some(value) if !value.is_empty() => out.push_str(value),
                        _ => out.push_str(captured),
                    }
                }
            }
        }
        out
    }
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}
