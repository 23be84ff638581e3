//! Request context the transport contributes to recorded events

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{
        header::{REFERER, USER_AGENT},
        request::Parts,
        HeaderMap, HeaderName,
    },
};

use crate::api::rate_limit::client_ip;
use crate::api::state::AppState;

/// Header-derived defaults for the origin fields of an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

impl RequestOrigin {
    pub fn from_headers(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        trust_proxy_headers: bool,
    ) -> Self {
        Self {
            user_agent: header_text(headers, USER_AGENT),
            referer: header_text(headers, REFERER),
            ip: client_ip(headers, peer, trust_proxy_headers).map(|ip| ip.to_string()),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Ok(Self::from_headers(
            &parts.headers,
            peer,
            state.config.trust_proxy_headers,
        ))
    }
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
