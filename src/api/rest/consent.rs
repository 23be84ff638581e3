//! Consent endpoints

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
use crate::types::{ConsentEvent, ConsentFlags, ConsentSubmission, EventTime};

/// Query parameters for listing consent events
#[derive(Debug, Deserialize)]
pub struct ListConsentParams {
    /// Maximum number of events to return
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of events to skip
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// One row of the consent listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentListItem {
    pub id: Uuid,
    pub consent: ConsentFlags,
    pub timestamp: EventTime,
    pub user_agent: Option<String>,
}

impl From<&ConsentEvent> for ConsentListItem {
    fn from(event: &ConsentEvent) -> Self {
        Self {
            id: event.id,
            consent: event.payload.consent,
            timestamp: event.timestamp.clone(),
            user_agent: event.origin.user_agent.clone(),
        }
    }
}

/// POST /api/consent - Record a consent choice
pub async fn record_consent(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
    payload: Result<Json<ConsentSubmission>, JsonRejection>,
) -> Result<RecordResponse, ApiError> {
    let Json(mut submission) = payload?;
    submission.user_agent = submission.user_agent.or(origin.user_agent);
    submission.ip = origin.ip;

    let receipt = state.catalog.record_consent(submission)?;
    Ok(Json(ApiResponse::with_message(
        receipt,
        "Consent saved successfully",
    )))
}

/// GET /api/consent - List consent events with pagination
pub async fn list_consent(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListConsentParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ConsentListItem>>>, ApiError> {
    let Query(params) = params?;
    let limit = normalized_limit(params.limit);

    let page = state.catalog.query_consent(params.offset, limit);
    let items = page.events.iter().map(|e| ConsentListItem::from(e.as_ref())).collect();

    Ok(Json(ApiResponse::page(items, page.total, limit, params.offset)))
}
