//! Request pipeline stages.
//!
//! # Order
//! ```text
//! timeout_as_json (408 from the timeout layer as JSON)
//!     → parse_body (size limit 413, buffer + parse JSON, 400 on malformed)
//!     → cors     (403 on blocked origin, 204 on preflight, CORS headers)
//!     → sanitize_body (trim/purify strings, strip operator keys)
//!     → version_gate  (400/426 on incompatible client)
//!     → router
//! ```
//!
//! Each stage either short-circuits with a final response or hands the
//! request to the next one; no stage is ever skipped or re-run.

pub mod body;
pub mod cors;
pub mod telemetry;
pub mod timeout;
pub mod version;

pub use body::{parse_body, sanitize_body, ParsedBody};
pub use cors::cors;
pub use telemetry::track_metrics;
pub use timeout::timeout_as_json;
pub use version::version_gate;
