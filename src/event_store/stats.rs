//! Statistics aggregation over the event catalog
//!
//! Provides the dashboard snapshot:
//! - Per-category totals
//! - Trailing 24h counts (all categories) and 7d count (consent)
//! - Consent breakdown into all / partial / essential-only

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::catalog::EventCatalog;
use crate::types::{
    CategoryStats, ConsentBreakdown, ConsentLevel, ConsentPayload, ConsentStats, EventRecord,
    StatsSnapshot,
};
use crate::utils::time::now;

/// Lower bounds of the trailing windows for one reference instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub last_24h: DateTime<Utc>,
    pub last_7d: DateTime<Utc>,
}

impl Windows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            last_24h: now - Duration::hours(24),
            last_7d: now - Duration::days(7),
        }
    }
}

/// Computes [`StatsSnapshot`]s from a catalog
pub struct StatsAggregator<'a> {
    catalog: &'a EventCatalog,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(catalog: &'a EventCatalog) -> Self {
        Self { catalog }
    }

    /// Snapshot as of the current instant
    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(now())
    }

    /// Snapshot as of `now`.
    ///
    /// Each category is read once, so its total, windowed counts and
    /// breakdown all describe the same observed state of its store.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> StatsSnapshot {
        let windows = Windows::ending_at(now);

        let consents = self.catalog.consent().snapshot();
        let analytics = self.catalog.analytics().snapshot();
        let marketing = self.catalog.marketing().snapshot();

        StatsSnapshot {
            consents: ConsentStats {
                total: consents.len(),
                last_24h: count_after(&consents, windows.last_24h),
                last_7d: count_after(&consents, windows.last_7d),
                breakdown: breakdown(&consents),
            },
            analytics: CategoryStats {
                total: analytics.len(),
                last_24h: count_after(&analytics, windows.last_24h),
            },
            marketing: CategoryStats {
                total: marketing.len(),
                last_24h: count_after(&marketing, windows.last_24h),
            },
            timestamp: now,
        }
    }
}

/// Number of events strictly after `bound`; malformed timestamps never count
pub fn count_after<P>(events: &[Arc<EventRecord<P>>], bound: DateTime<Utc>) -> usize {
    events.iter().filter(|e| e.timestamp.is_after(bound)).count()
}

/// Classify every consent event. The buckets always sum to `events.len()`.
pub fn breakdown(events: &[Arc<EventRecord<ConsentPayload>>]) -> ConsentBreakdown {
    events
        .iter()
        .fold(ConsentBreakdown::default(), |mut acc, event| {
            match event.payload.consent.level() {
                ConsentLevel::AllAccepted => acc.all_accepted += 1,
                ConsentLevel::PartialAccepted => acc.partial_accepted += 1,
                ConsentLevel::EssentialOnly => acc.essential_only += 1,
            }
            acc
        })
}
