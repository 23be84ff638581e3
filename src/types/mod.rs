//! Data types for the consent tracker
//!
//! This module contains the event records, the record-operation inputs and
//! the statistics snapshot.

mod event;
mod payload;
mod stats;
mod submission;

pub use event::{default_session_id, EventOrigin, EventRecord, EventTime, NewEvent, RecordReceipt};
pub use payload::{
    AnalyticsEvent, AnalyticsPayload, ConsentEvent, ConsentFlags, ConsentLevel, ConsentPayload,
    MarketingEvent, MarketingPayload,
};
pub use stats::{CategoryStats, ConsentBreakdown, ConsentStats, StatsSnapshot};
pub use submission::{AnalyticsSubmission, ConsentSubmission, MarketingSubmission};

pub(crate) use submission::{build_origin, without_reserved};

/// Result type for the server binary
pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
