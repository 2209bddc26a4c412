//! Configuration interpolation.
//!
//! # Responsibilities
//! - Substitute `${NAME}` spans from a flat configuration mapping
//! - Resolve missing keys to the empty string
//!
//! # Design Decisions
//! - Shortest-span scan: a placeholder ends at the first `}`
//! - Output is never re-scanned (no recursive expansion)
//! - Pure function of (template, config)

use std::collections::HashMap;

/// Flat, read-only variable mapping used for template interpolation.
///
/// Sourcing (environment, files) is the caller's concern; this crate only
/// reads it.
pub type ConfigMap = HashMap<String, String>;

/// Replace every `${NAME}` span in `template` with `config[NAME]`, or with
/// the empty string when the key is absent. An unterminated `${` is kept
/// as literal text.
pub fn interpolate(template: &str, config: &ConfigMap) -> String {
    if template.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                if let Some(value) = config.get(&after[..end]) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
