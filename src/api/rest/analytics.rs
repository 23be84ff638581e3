//! Analytics endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::origin::RequestOrigin;
use super::{normalized_limit, ApiError, ApiResponse, RecordResponse};
use crate::api::state::AppState;
use crate::types::{AnalyticsEvent, AnalyticsSubmission, EventTime};

/// Query parameters for listing analytics events
#[derive(Debug, Deserialize)]
pub struct ListAnalyticsParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    /// Only events with exactly this type
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

fn default_limit() -> usize {
    100
}

/// One row of the analytics listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsListItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: EventTime,
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

impl From<&AnalyticsEvent> for AnalyticsListItem {
    fn from(event: &AnalyticsEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.payload.event_type.clone(),
            timestamp: event.timestamp.clone(),
            url: event.origin.url.clone(),
            user_agent: event.origin.user_agent.clone(),
        }
    }
}

/// POST /api/analytics - Record an analytics event
///
/// `url` defaults to the Referer header and `userAgent` to the User-Agent header.
pub async fn record_analytics(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
    payload: Result<Json<AnalyticsSubmission>, JsonRejection>,
) -> Result<RecordResponse, ApiError> {
    let Json(mut submission) = payload?;
    submission.url = submission.url.or(origin.referer);
    submission.user_agent = submission.user_agent.or(origin.user_agent);
    submission.ip = origin.ip;

    let receipt = state.catalog.record_analytics(submission)?;
    Ok(Json(ApiResponse::with_message(
        receipt,
        "Analytics event recorded",
    )))
}

/// GET /api/analytics - List analytics events, optionally filtered by type
pub async fn list_analytics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListAnalyticsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<AnalyticsListItem>>>, ApiError> {
    let Query(params) = params?;
    let limit = normalized_limit(params.limit);

    let page = state
        .catalog
        .query_analytics(params.offset, limit, params.event_type.as_deref());
    let items = page.events.iter().map(|e| AnalyticsListItem::from(e.as_ref())).collect();

    Ok(Json(ApiResponse::page(items, page.total, limit, params.offset)))
}
