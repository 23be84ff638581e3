//! Marketing endpoints

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
use crate::types::{EventTime, MarketingEvent, MarketingSubmission};

/// Query parameters for listing marketing events
#[derive(Debug, Deserialize)]
pub struct ListMarketingParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub action: Option<String>,
}

fn default_limit() -> usize {
    50
}

/// One row of the marketing listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingListItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub action: String,
    pub timestamp: EventTime,
    pub user_agent: Option<String>,
}

impl From<&MarketingEvent> for MarketingListItem {
    fn from(event: &MarketingEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.payload.event_type.clone(),
            action: event.payload.action.clone(),
            timestamp: event.timestamp.clone(),
            user_agent: event.origin.user_agent.clone(),
        }
    }
}

/// POST /api/marketing - Record a marketing event
pub async fn record_marketing(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
    payload: Result<Json<MarketingSubmission>, JsonRejection>,
) -> Result<RecordResponse, ApiError> {
    let Json(mut submission) = payload?;
    submission.user_agent = submission.user_agent.or(origin.user_agent);
    submission.ip = origin.ip;

    let receipt = state.catalog.record_marketing(submission)?;
    Ok(Json(ApiResponse::with_message(
        receipt,
        "Marketing event recorded",
    )))
}

/// GET /api/marketing - List marketing events, optionally filtered by type and action
pub async fn list_marketing(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListMarketingParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<MarketingListItem>>>, ApiError> {
    let Query(params) = params?;
    let limit = normalized_limit(params.limit);

    let page = state.catalog.query_marketing(
        params.offset,
        limit,
        params.event_type.as_deref(),
        params.action.as_deref(),
    );
    let items = page.events.iter().map(|e| MarketingListItem::from(e.as_ref())).collect();

    Ok(Json(ApiResponse::page(items, page.total, limit, params.offset)))
}
