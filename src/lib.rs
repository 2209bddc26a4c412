//! Proxy-side request filter core.
//!
//! Compiles declarative forwarding rules (method, parameterized path
//! template, upstream origin, validity filters, credential injection) into
//! an ordered list of matchers, then classifies each inbound request
//! against them to produce a forwarding directive.
//!
//! # Architecture Overview
//!
//! ```text
//! rule document ──▶ config::loader ──▶ routing::compiler ──▶ [CompiledRule]
//!                                                                  │
//! ConfigMap ──▶ config::interpolate (paths, origins, credentials)  │
//!                                                                  ▼
//! inbound Request ──────────────────────────────────▶ routing::router
//!                                                                  │
//!                             MatchResult (url, auth, stream) ◀────┘
//! ```
//!
//! The transport layer that receives and forwards HTTP traffic is an
//! external collaborator: it hands this crate a [`Request`] and performs
//! the actual upstream call described by the returned [`MatchResult`].

pub mod config;
pub mod routing;

pub use config::interpolate::{interpolate, ConfigMap};
pub use config::loader::{LoadError, RuleSource};
pub use config::schema::{AuthConfig, Rule, ValidityFilter};
pub use routing::compiler::{compile, CompileError, CompiledRule};
pub use routing::router::{MatchError, MatchResult, Request, Router, SharedRouter};
