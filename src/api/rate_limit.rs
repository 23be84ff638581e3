//! Per-client-IP rate limiting for `/api/*`

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use governor::{clock::Clock, clock::DefaultClock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use super::rest::ApiError;
use super::state::AppState;
use crate::config::RateLimitConfig;

/// Checks between two sweeps of idle client buckets
const PRUNE_EVERY: u64 = 1024;

/// Token-bucket limiter keyed by client IP
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    max_requests: u32,
    checks: AtomicU64,
}

impl ClientRateLimiter {
    /// `max_requests` per `window`, refilled evenly across the window.
    ///
    /// The refill period never drops below one nanosecond. Returns `None`
    /// only when `max_requests` is zero.
    pub fn new(config: &RateLimitConfig) -> Option<Self> {
        let burst = NonZeroU32::new(config.max_requests)?;
        let period = (config.window / config.max_requests).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(Self {
            limiter: RateLimiter::keyed(quota),
            max_requests: config.max_requests,
            checks: AtomicU64::new(0),
        })
    }

    /// Take one request from `ip`'s budget. On refusal, returns seconds to wait.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        self.limiter.check_key(&ip).map_err(|not_until| {
            not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1)
        })
    }

    /// Forget clients whose bucket has fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(clients = self.limiter.len(), "pruned rate limiter");
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// Resolve the client address.
///
/// The socket peer is authoritative. Only when `trust_proxy_headers` is set
/// (the server sits behind a reverse proxy) do the first `X-Forwarded-For`
/// hop and then `X-Real-IP` take precedence.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    let peer_ip: Option<IpAddr> = peer.map(|addr| addr.ip());
    if !trust_proxy_headers {
        return peer_ip;
    }

    let forwarded: Option<IpAddr> = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .and_then(|first| first.trim().parse().ok());

    let real_ip = || -> Option<IpAddr> {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    };

    forwarded.or_else(real_ip).or(peer_ip)
}

/// Middleware rejecting clients that exceeded their budget with 429
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return Ok(next.run(request).await);
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), peer, state.config.trust_proxy_headers)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(retry_after) = limiter.check(ip) {
        warn!(client = %ip, retry_after, "rate limit exceeded");
        return Err(ApiError::RateLimited { retry_after });
    }

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&limiter.max_requests().to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-ratelimit-limit"), value);
    }
    Ok(response)
}
