//! Consent Tracker
//!
//! In-memory backend for a cookie-consent widget: it records consent
//! choices and synthetic analytics/marketing events, and serves windowed
//! statistics to a dashboard.
//!
//! # Features
//!
//! - **Bounded stores**: one FIFO log per category (consent 1000, analytics 5000, marketing 2000)
//! - **Thread-Safe**: one read/write lock per store, categories never contend
//! - **Windowed stats**: last 24h / last 7d counts and a consent breakdown
//! - **Filtering**: exact-match type/action filters applied before pagination
//!
//! # Modules
//!
//! - `types`: Event records, submissions and the statistics snapshot
//! - `event_store`: Bounded stores, the catalog and the aggregator
//! - `validation`: Required-field checks
//! - `config`: Environment-driven settings
//! - `api`: Axum transport
//! - `utils`: Utility functions (timestamps)
//!
//! Nothing is persisted: every event is lost when the process exits.
//!
//! # Example
//!
//! ```no_run
//! use consent_tracker::{EventCatalog, StatsAggregator};
//! use consent_tracker::types::AnalyticsSubmission;
//!
//! let catalog = EventCatalog::new();
//! catalog
//!     .record_analytics(AnalyticsSubmission {
//!         event_type: Some("page_view".to_string()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! let stats = StatsAggregator::new(&catalog).snapshot();
//! assert_eq!(stats.analytics.total, 1);
//! ```

pub mod api;
pub mod config;
pub mod event_store;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use config::ServerConfig;
pub use event_store::{BoundedEventStore, CatalogConfig, EventCatalog, Page, StatsAggregator};
pub use types::{
    ConsentFlags, EventOrigin, EventRecord, EventTime, RecordReceipt, ServerResult, StatsSnapshot,
};
pub use validation::ValidationError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
