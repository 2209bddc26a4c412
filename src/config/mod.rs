//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! rule document (inline list | injected loader | JSON file)
//!     → loader.rs (resolve to a raw rule list, fail-closed)
//!     → schema.rs (typed Rule / ValidityFilter / AuthConfig)
//!     → routing::compiler (compiled matchers)
//!
//! ConfigMap (flat string map, externally sourced)
//!     → interpolate.rs (${NAME} substitution)
//!     → path templates, origins, credentials
//! ```
//!
//! # Design Decisions
//! - Rules and config values are immutable once compilation starts
//! - Filter and auth shapes are discriminated once, at deserialization
//! - Missing interpolation keys resolve to the empty string

pub mod interpolate;
pub mod loader;
pub mod schema;

pub use interpolate::{interpolate, ConfigMap};
pub use loader::{LoadError, RuleSource};
pub use schema::{AuthConfig, Rule, ValidityFilter};
