//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `CORS_ALLOWED_ORIGINS` | `http://localhost:5500,http://127.0.0.1:5500,http://localhost:3000` |
//! | `CONSENT_CAPACITY` | `1000` |
//! | `ANALYTICS_CAPACITY` | `5000` |
//! | `MARKETING_CAPACITY` | `2000` |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_MAX_REQUESTS` | `100` |
//! | `RATE_LIMIT_WINDOW_SECS` | `900` |
//! | `TRUST_PROXY_HEADERS` | `false` |

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::event_store::CatalogConfig;

const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:5500",
    "http://127.0.0.1:5500",
    "http://localhost:3000",
];

/// Per-client-IP request budget for `/api/*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Everything the binary needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub catalog: CatalogConfig,
    pub rate_limit: RateLimitConfig,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe behind a reverse proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
            catalog: CatalogConfig::default(),
            rate_limit: RateLimitConfig::default(),
            trust_proxy_headers: false,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key → value source. Invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_origins,
        };

        let catalog = CatalogConfig {
            consent_capacity: capacity(&lookup, "CONSENT_CAPACITY", defaults.catalog.consent_capacity),
            analytics_capacity: capacity(
                &lookup,
                "ANALYTICS_CAPACITY",
                defaults.catalog.analytics_capacity,
            ),
            marketing_capacity: capacity(
                &lookup,
                "MARKETING_CAPACITY",
                defaults.catalog.marketing_capacity,
            ),
        };

        let max_requests: u32 = parse_or(
            &lookup,
            "RATE_LIMIT_MAX_REQUESTS",
            defaults.rate_limit.max_requests,
        );
        let window_secs: u64 = parse_or(
            &lookup,
            "RATE_LIMIT_WINDOW_SECS",
            defaults.rate_limit.window.as_secs(),
        );
        let rate_limit = RateLimitConfig {
            enabled: parse_or(&lookup, "RATE_LIMIT_ENABLED", defaults.rate_limit.enabled),
            max_requests: if max_requests == 0 {
                warn!("RATE_LIMIT_MAX_REQUESTS must be positive, using default");
                defaults.rate_limit.max_requests
            } else {
                max_requests
            },
            window: if window_secs == 0 {
                warn!("RATE_LIMIT_WINDOW_SECS must be positive, using default");
                defaults.rate_limit.window
            } else {
                Duration::from_secs(window_secs)
            },
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            allowed_origins,
            catalog,
            rate_limit,
            trust_proxy_headers: parse_or(
                &lookup,
                "TRUST_PROXY_HEADERS",
                defaults.trust_proxy_headers,
            ),
        }
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => default,
    }
}

fn capacity<F>(lookup: &F, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default) {
        0 => {
            warn!("{key} must be at least 1, using default: {default}");
            default
        }
        n => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.catalog.consent_capacity, 1000);
        assert_eq!(config.catalog.analytics_capacity, 5000);
        assert_eq!(config.catalog.marketing_capacity, 2000);
        assert_eq!(config.allowed_origins.len(), 3);
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example ,"),
            ("CONSENT_CAPACITY", "10"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("RATE_LIMIT_MAX_REQUESTS", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("TRUST_PROXY_HEADERS", "true"),
        ]));

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.catalog.consent_capacity, 10);
        assert_eq!(config.catalog.analytics_capacity, 5000);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert!(config.trust_proxy_headers);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("MARKETING_CAPACITY", "0"),
            ("RATE_LIMIT_MAX_REQUESTS", "0"),
            ("RATE_LIMIT_WINDOW_SECS", "-1"),
        ]));

        assert_eq!(config.port, 3000);
        assert_eq!(config.catalog.marketing_capacity, 2000);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }
}
