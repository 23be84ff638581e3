//! API module for HTTP endpoints
//!
//! This module is the transport around the event catalog: routing, JSON
//! encoding, CORS, rate limiting and the security headers. The catalog
//! itself knows nothing about HTTP.

pub mod http;
pub mod rate_limit;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
