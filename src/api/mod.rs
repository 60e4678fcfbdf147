//! REST API module
//!
//! HTTP surface for triggering client notifications from outside the batch
//! pipeline. Compiled only with the `server` feature.

#[cfg(feature = "server")]
pub mod information_request;

#[cfg(feature = "server")]
pub use information_request::{information_request_router, ApiState};
