//! Event Catalog - one bounded store per category
//!
//! The catalog validates incoming submissions, turns them into events and
//! routes them to the matching store. Each store has its own lock, so
//! traffic on one category never waits on another.

use tracing::{info, warn};

use super::store::{BoundedEventStore, Page};
use crate::types::{
    build_origin, without_reserved, AnalyticsPayload, AnalyticsSubmission, ConsentPayload,
    ConsentSubmission, MarketingPayload, MarketingSubmission, NewEvent, RecordReceipt,
};
use crate::validation::{parse_consent, required_text, ValidationError};

/// Store capacities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub consent_capacity: usize,
    pub analytics_capacity: usize,
    pub marketing_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            consent_capacity: 1000,
            analytics_capacity: 5000,
            marketing_capacity: 2000,
        }
    }
}

/// The three category stores, created once per process
#[derive(Debug)]
pub struct EventCatalog {
    consent: BoundedEventStore<ConsentPayload>,
    analytics: BoundedEventStore<AnalyticsPayload>,
    marketing: BoundedEventStore<MarketingPayload>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCatalog {
    /// Create a catalog with the default capacities
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// Create a catalog with custom capacities
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            consent: BoundedEventStore::new("consent", config.consent_capacity),
            analytics: BoundedEventStore::new("analytics", config.analytics_capacity),
            marketing: BoundedEventStore::new("marketing", config.marketing_capacity),
        }
    }

    pub fn consent(&self) -> &BoundedEventStore<ConsentPayload> {
        &self.consent
    }

    pub fn analytics(&self) -> &BoundedEventStore<AnalyticsPayload> {
        &self.analytics
    }

    pub fn marketing(&self) -> &BoundedEventStore<MarketingPayload> {
        &self.marketing
    }

    // ========================================================================
    // Record
    // ========================================================================

    /// Record a consent choice
    pub fn record_consent(
        &self,
        submission: ConsentSubmission,
    ) -> Result<RecordReceipt, ValidationError> {
        let consent = parse_consent(submission.consent.as_ref()).inspect_err(|e| {
            warn!(category = "consent", error = %e, "rejected consent submission");
        })?;

        let origin = build_origin(
            submission.user_agent,
            None,
            submission.session_id,
            submission.ip,
        );
        let event = NewEvent {
            id: None,
            timestamp: submission.timestamp,
            origin,
            payload: ConsentPayload { consent },
        };

        let record = self.consent.append(event);
        info!(
            category = "consent",
            id = %record.id,
            level = ?consent.level(),
            "consent saved"
        );
        Ok(RecordReceipt::from(record.as_ref()))
    }

    /// Record an analytics event. Extra fields are stored verbatim.
    pub fn record_analytics(
        &self,
        submission: AnalyticsSubmission,
    ) -> Result<RecordReceipt, ValidationError> {
        let Some(event_type) = required_text(submission.event_type) else {
            warn!(category = "analytics", "rejected analytics event without type");
            return Err(ValidationError::MissingEventType);
        };

        let origin = build_origin(
            submission.user_agent,
            submission.url,
            submission.session_id,
            submission.ip,
        );
        let event = NewEvent {
            id: None,
            timestamp: submission.timestamp,
            origin,
            payload: AnalyticsPayload {
                event_type,
                extra: without_reserved(submission.extra),
            },
        };

        let record = self.analytics.append(event);
        info!(
            category = "analytics",
            id = %record.id,
            event_type = %record.payload.event_type,
            "analytics event recorded"
        );
        Ok(RecordReceipt::from(record.as_ref()))
    }

    /// Record a marketing event. Both `type` and `action` are required.
    pub fn record_marketing(
        &self,
        submission: MarketingSubmission,
    ) -> Result<RecordReceipt, ValidationError> {
        let (Some(event_type), Some(action)) = (
            required_text(submission.event_type),
            required_text(submission.action),
        ) else {
            warn!(category = "marketing", "rejected marketing event without type or action");
            return Err(ValidationError::MissingTypeOrAction);
        };

        let origin = build_origin(submission.user_agent, None, submission.session_id, submission.ip);
        let event = NewEvent {
            id: None,
            timestamp: submission.timestamp,
            origin,
            payload: MarketingPayload {
                event_type,
                action,
                extra: without_reserved(submission.extra),
            },
        };

        let record = self.marketing.append(event);
        info!(
            category = "marketing",
            id = %record.id,
            event_type = %record.payload.event_type,
            action = %record.payload.action,
            "marketing event recorded"
        );
        Ok(RecordReceipt::from(record.as_ref()))
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Page through consent events in insertion order
    pub fn query_consent(&self, offset: usize, limit: usize) -> Page<ConsentPayload> {
        self.consent.slice(offset, limit)
    }

    /// Page through analytics events, optionally only those of one type.
    ///
    /// `total` counts the filtered events. An empty filter is ignored.
    pub fn query_analytics(
        &self,
        offset: usize,
        limit: usize,
        type_filter: Option<&str>,
    ) -> Page<AnalyticsPayload> {
        match non_empty(type_filter) {
            Some(wanted) => Page::from_events(
                self.analytics.filter(|e| e.payload.event_type == wanted),
                offset,
                limit,
            ),
            None => self.analytics.slice(offset, limit),
        }
    }

    /// Page through marketing events, optionally filtered by type and/or action
    pub fn query_marketing(
        &self,
        offset: usize,
        limit: usize,
        type_filter: Option<&str>,
        action_filter: Option<&str>,
    ) -> Page<MarketingPayload> {
        let type_filter = non_empty(type_filter);
        let action_filter = non_empty(action_filter);

        if type_filter.is_none() && action_filter.is_none() {
            return self.marketing.slice(offset, limit);
        }

        let matching = self.marketing.filter(|e| {
            type_filter.map_or(true, |t| e.payload.event_type == t)
                && action_filter.map_or(true, |a| e.payload.action == a)
        });
        Page::from_events(matching, offset, limit)
    }
}

fn non_empty(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}
