//! Authorization-header resolution.
//!
//! # Responsibilities
//! - Interpolate credential templates from the configuration mapping
//! - Produce the Authorization header value for a compiled rule
//!
//! # Design Decisions
//! - Credential fields are interpolated independently, then combined
//! - Resolution happens at compile time; its inputs are static

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::interpolate::{interpolate, ConfigMap};
use crate::config::schema::AuthConfig;

/// Compute the Authorization header value for a rule's auth strategy.
/// Rules without auth never reach this function.
pub fn resolve(auth: &AuthConfig, config: &ConfigMap) -> String {
    match auth {
        AuthConfig::Token { token } => format!("Token {}", interpolate(token, config)),
        AuthConfig::Basic { username, password } => {
            let credentials = format!(
                "{}:{}",
                interpolate(username, config),
                interpolate(password, config)
            );
            format!("Basic {}", STANDARD.encode(credentials))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_token_auth() {
        let auth = AuthConfig::Token {
            token: "${API_TOKEN}".to_string(),
        };
        let cfg = config(&[("API_TOKEN", "s3cr3t")]);
        assert_eq!(resolve(&auth, &cfg), "Token s3cr3t");
    }

    #[test]
    fn test_basic_auth_encodes_credentials() {
        let auth = AuthConfig::Basic {
            username: "${USER}".to_string(),
            password: "${PASS}".to_string(),
        };
        let cfg = config(&[("USER", "user"), ("PASS", "pass")]);
        // base64("user:pass")
        assert_eq!(resolve(&auth, &cfg), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_missing_config_keys_interpolate_empty() {
        let auth = AuthConfig::Basic {
            username: "${USER}".to_string(),
            password: "${PASS}".to_string(),
        };
        // base64(":")
        assert_eq!(resolve(&auth, &ConfigMap::new()), "Basic Og==");
    }
}
