//! Statistics endpoint - dashboard snapshot

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};

use super::ApiResponse;
use crate::api::state::AppState;
use crate::event_store::StatsAggregator;

/// GET /api/stats - Totals, trailing-window counts and consent breakdown
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = StatsAggregator::new(&state.catalog).snapshot();
    Json(ApiResponse::new(snapshot))
}
