//! Shared application state for HTTP handlers

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use super::rate_limit::ClientRateLimiter;
use crate::config::ServerConfig;
use crate::event_store::EventCatalog;

/// State handed to every request handler
pub struct AppState {
    /// The event stores, created once at startup
    pub catalog: Arc<EventCatalog>,

    /// Settings the router is built from
    pub config: ServerConfig,

    /// `None` when rate limiting is disabled
    pub rate_limiter: Option<ClientRateLimiter>,

    started_at: Instant,
}

impl AppState {
    /// Create a new AppState around an existing catalog
    pub fn new(catalog: Arc<EventCatalog>, config: ServerConfig) -> Self {
        let rate_limiter = if config.rate_limit.enabled {
            let limiter = ClientRateLimiter::new(&config.rate_limit);
            if limiter.is_none() {
                warn!(
                    max_requests = config.rate_limit.max_requests,
                    window_secs = config.rate_limit.window.as_secs(),
                    "rate limiting enabled but the quota is unusable, requests are not limited"
                );
            }
            limiter
        } else {
            None
        };

        Self {
            catalog,
            config,
            rate_limiter,
            started_at: Instant::now(),
        }
    }

    /// Catalog sized from `config`
    pub fn from_config(config: ServerConfig) -> Self {
        let catalog = Arc::new(EventCatalog::with_config(config.catalog.clone()));
        Self::new(catalog, config)
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
