//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (add request ID)
//!     → middleware/ (parse, CORS, sanitize, version gate)
//!     → routing (application routes or 404 fallback)
//!     → response.rs (errors rendered as JSON)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
