//! Utility functions and helpers
//!
//! This module contains timestamp utilities.

pub mod time;

pub use time::{event_time_from_json, now, parse_event_time, to_iso8601};
