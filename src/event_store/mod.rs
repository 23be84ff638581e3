//! Event Store Module
//!
//! This module provides the in-memory telemetry core:
//! - `BoundedEventStore`: capacity-bounded FIFO log for one category
//! - `EventCatalog`: the consent, analytics and marketing stores
//! - `StatsAggregator`: windowed dashboard statistics
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌────────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ Widget  │───►│ EventCatalog   │───►│ store.append()   │───►│ evict oldest │
//! │ Request │    │ validate+route │    │ (per-store lock) │    │ if over cap  │
//! └─────────┘    └────────────────┘    └──────────────────┘    └──────────────┘
//!
//! Read Path:
//! ┌───────────┐    ┌──────────────────────┐    ┌────────────────┐
//! │ Dashboard │───►│ snapshot each store  │───►│ StatsSnapshot  │
//! │ Request   │    │ (shared read lock)   │    │ windows+counts │
//! └───────────┘    └──────────────────────┘    └────────────────┘
//! ```
//!
//! Nothing is persisted; all events are lost on restart.

mod catalog;
mod stats;
mod store;

pub use catalog::{CatalogConfig, EventCatalog};
pub use stats::{breakdown, count_after, StatsAggregator, Windows};
pub use store::{BoundedEventStore, Page};
