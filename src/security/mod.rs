//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gatekeeper.rs (block list → rate limit → pattern scan → session)
//!     → route handler (csrf.rs validation, patterns.rs field checks,
//!       sanitize.rs cleaning on the form endpoint)
//!     → headers.rs (security response headers on everything)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: reject first (validators), then clean (sanitizer)
//! - Fail closed: any check failure terminates the request
//! - Block on first strong signal; no scoring or trust model

pub mod csrf;
pub mod gatekeeper;
pub mod headers;
pub mod patterns;
pub mod rate_limit;
pub mod sanitize;
pub mod session;
