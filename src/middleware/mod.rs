//! Middleware for observability and CORS.
//!
//! This module provides:
//! - Request logging with latency tracking
//! - CORS headers and preflight handling

pub mod cors;
pub mod logging;

pub use cors::cors_middleware;
pub use logging::request_logging;
