//! Event envelope shared by every category
//!
//! Each stored event is an [`EventRecord`]: an id, a point in time, the
//! client-supplied origin metadata and a category-specific payload. Records
//! are immutable once they reach a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::utils::time::{event_time_from_json, to_iso8601};

/// When an event happened
///
/// Callers may send any JSON value. RFC 3339 strings and epoch milliseconds
/// become an absolute instant; everything else is kept verbatim and sits
/// outside every window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// A parsed instant
    At(DateTime<Utc>),
    /// Unparseable caller text
    Malformed(String),
}

impl EventTime {
    /// True when the event happened strictly after `bound`
    pub fn is_after(&self, bound: DateTime<Utc>) -> bool {
        matches!(self, EventTime::At(at) if *at > bound)
    }

    /// Blank caller text is treated as "not supplied"
    pub fn is_blank(&self) -> bool {
        matches!(self, EventTime::Malformed(raw) if raw.trim().is_empty())
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(at: DateTime<Utc>) -> Self {
        EventTime::At(at)
    }
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventTime::At(at) => f.write_str(&to_iso8601(at)),
            EventTime::Malformed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(event_time_from_json(raw))
    }
}

/// Client context carried with every event. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrigin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Referring page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Session id recorded when the client sends none
pub fn default_session_id() -> String {
    "anonymous".to_string()
}

impl Default for EventOrigin {
    fn default() -> Self {
        Self {
            user_agent: None,
            url: None,
            session_id: default_session_id(),
            ip: None,
        }
    }
}

/// A stored event of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord<P> {
    pub id: Uuid,
    pub timestamp: EventTime,
    #[serde(flatten)]
    pub origin: EventOrigin,
    #[serde(flatten)]
    pub payload: P,
}

/// An event on its way into a store
///
/// The store fills in `id` and `timestamp` when they are absent.
#[derive(Debug, Clone)]
pub struct NewEvent<P> {
    pub id: Option<Uuid>,
    pub timestamp: Option<EventTime>,
    pub origin: EventOrigin,
    pub payload: P,
}

impl<P> NewEvent<P> {
    /// Event with default origin, fresh id and insertion-time timestamp
    pub fn new(payload: P) -> Self {
        Self {
            id: None,
            timestamp: None,
            origin: EventOrigin::default(),
            payload,
        }
    }

    /// Set the caller-supplied timestamp
    pub fn at(mut self, timestamp: impl Into<EventTime>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Freeze into a record, defaulting missing fields
    pub fn into_record(self, now: DateTime<Utc>) -> EventRecord<P> {
        EventRecord {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            timestamp: self
                .timestamp
                .filter(|t| !t.is_blank())
                .unwrap_or(EventTime::At(now)),
            origin: self.origin,
            payload: self.payload,
        }
    }
}

/// What a record operation hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReceipt {
    pub id: Uuid,
    pub timestamp: EventTime,
}

impl<P> From<&EventRecord<P>> for RecordReceipt {
    fn from(record: &EventRecord<P>) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp.clone(),
        }
    }
}
