//! Dashboard statistics value

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::time::serialize_iso8601;

/// Three-way consent classification counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentBreakdown {
    pub all_accepted: usize,
    pub partial_accepted: usize,
    pub essential_only: usize,
}

impl ConsentBreakdown {
    /// Sum of the three buckets; equals the number of classified events
    pub fn total(&self) -> usize {
        self.all_accepted + self.partial_accepted + self.essential_only
    }
}

/// Consent statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsentStats {
    pub total: usize,
    #[serde(rename = "last24h")]
    pub last_24h: usize,
    #[serde(rename = "last7d")]
    pub last_7d: usize,
    pub breakdown: ConsentBreakdown,
}

/// Totals for analytics or marketing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    #[serde(rename = "last24h")]
    pub last_24h: usize,
}

/// Point-in-time statistics over all three stores.
///
/// Recomputed from scratch on every request; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub consents: ConsentStats,
    pub analytics: CategoryStats,
    pub marketing: CategoryStats,
    /// The reference instant the windows were computed against
    #[serde(serialize_with = "serialize_iso8601")]
    pub timestamp: DateTime<Utc>,
}
