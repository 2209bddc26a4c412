//! Rule-matching subsystem.
//!
//! # Data Flow
//! ```text
//! Rule definitions (RuleSource)
//!     → compiler.rs (normalize methods, partition filters,
//!       build path templates + parameter defaults, resolve auth)
//!     → Vec<CompiledRule> (ordered, immutable)
//!     → router.rs (first-match dispatch per request)
//!         → matcher.rs (path-template captures + rewrite)
//!         → filters.rs (body/query OR chain, header AND check)
//!     → MatchResult | Blocked
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at match time
//! - First match wins (declaration order)
//! - Filter shapes fixed at compile time, never re-inspected per request
//! - Blocked is an expected outcome, distinct from any fault

pub mod auth;
pub mod compiler;
pub mod filters;
pub mod matcher;
pub mod router;

pub use compiler::{compile, CompileError, CompiledRule};
pub use router::{MatchError, MatchResult, Request, Router, SharedRouter};
