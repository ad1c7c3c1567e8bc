//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → origin.rs (whitelist decision for the Origin header)
//!     → sanitizer.rs (trim and purify every string in the JSON body)
//!     → operators.rs (drop `$`-prefixed and dotted keys)
//!     → Pass to version gate and routing
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod operators;
pub mod origin;
pub mod sanitizer;

pub use operators::strip_operator_keys;
pub use origin::{CorsDecision, EmptyWhitelist, Whitelist};
pub use sanitizer::{SanitizeError, Sanitizer};
