//! Category-specific payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::EventRecord;

/// The six cookie-consent switches shown by the banner.
///
/// Flags the client omits are `false`. `essential` is always on in the
/// widget but nothing here enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentFlags {
    pub essential: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub performance: bool,
    pub targeting: bool,
    pub functional: bool,
}

/// Coarse classification used by the dashboard breakdown.
///
/// Only `analytics` and `marketing` participate; the other four flags are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentLevel {
    /// Analytics and marketing both granted
    AllAccepted,
    /// Exactly one of analytics/marketing granted
    PartialAccepted,
    /// Neither granted
    EssentialOnly,
}

impl ConsentFlags {
    /// Everything granted
    pub fn all() -> Self {
        Self {
            essential: true,
            analytics: true,
            marketing: true,
            performance: true,
            targeting: true,
            functional: true,
        }
    }

    /// Only the essential cookies
    pub fn essential_only() -> Self {
        Self {
            essential: true,
            ..Self::default()
        }
    }

    pub fn level(&self) -> ConsentLevel {
        match (self.analytics, self.marketing) {
            (true, true) => ConsentLevel::AllAccepted,
            (false, false) => ConsentLevel::EssentialOnly,
            _ => ConsentLevel::PartialAccepted,
        }
    }
}

/// Payload of a consent event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentPayload {
    pub consent: ConsentFlags,
}

/// Payload of an analytics event: a type tag plus whatever else the client sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a marketing event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub action: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type ConsentEvent = EventRecord<ConsentPayload>;
pub type AnalyticsEvent = EventRecord<AnalyticsPayload>;
pub type MarketingEvent = EventRecord<MarketingPayload>;
