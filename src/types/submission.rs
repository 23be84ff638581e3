//! Inputs of the record operations
//!
//! These mirror what the browser widget posts. Required fields are optional
//! here so that a missing one surfaces as a [`crate::validation::ValidationError`]
//! instead of a deserialization failure.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::event::{default_session_id, EventOrigin, EventTime};

/// A consent choice
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSubmission {
    /// Raw flag record; checked by the catalog
    pub consent: Option<Value>,
    pub timestamp: Option<EventTime>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    /// Filled by the transport, never read from the body
    #[serde(skip)]
    pub ip: Option<String>,
}

/// An analytics event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSubmission {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub timestamp: Option<EventTime>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    #[serde(skip)]
    pub ip: Option<String>,
    /// Every other field, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A marketing event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingSubmission {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub action: Option<String>,
    pub timestamp: Option<EventTime>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    #[serde(skip)]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys the server owns on a stored record; clients cannot supply them
const RESERVED_KEYS: &[&str] = &["id", "ip"];

/// Drop client-supplied fields that would shadow server-assigned ones
pub(crate) fn without_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        extra.remove(*key);
    }
    extra
}

pub(crate) fn build_origin(
    user_agent: Option<String>,
    url: Option<String>,
    session_id: Option<String>,
    ip: Option<String>,
) -> EventOrigin {
    EventOrigin {
        user_agent,
        url,
        session_id: session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_session_id),
        ip,
    }
}
