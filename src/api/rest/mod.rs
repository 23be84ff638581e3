//! REST API module for HTTP endpoints
//!
//! Provides the endpoints used by the consent widget and the dashboard:
//! - `POST /api/consent`, `GET /api/consent` - Record and list consent choices
//! - `POST /api/analytics`, `GET /api/analytics` - Record and list analytics events
//! - `POST /api/marketing`, `GET /api/marketing` - Record and list marketing events
//! - `GET /api/stats` - Dashboard statistics

pub mod analytics;
pub mod consent;
pub mod marketing;
pub mod origin;
pub mod stats;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::types::RecordReceipt;
use crate::validation::ValidationError;

/// Largest page a list endpoint returns
pub const MAX_PAGE_SIZE: usize = 1000;

/// Clamp a requested page size to [`MAX_PAGE_SIZE`]
pub fn normalized_limit(limit: usize) -> usize {
    limit.min(MAX_PAGE_SIZE)
}

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data
    pub data: T,
    /// Total count (for paginated responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            total: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(data)
        }
    }

    pub fn page(data: T, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            total: Some(total),
            limit: Some(limit),
            offset: Some(offset),
            ..Self::new(data)
        }
    }
}

/// Response of a record endpoint
pub type RecordResponse = Json<ApiResponse<RecordReceipt>>;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
    /// Offending request field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Everything an HTTP handler can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed request body: {0}")]
    MalformedPayload(String),

    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited { retry_after: u64 },

    #[error("Endpoint not found")]
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedPayload(_) | ApiError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::MalformedPayload(_) | ApiError::InvalidQuery(_) => "BAD_REQUEST",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            code: self.code(),
            field: match &self {
                ApiError::Validation(e) => Some(e.field()),
                _ => None,
            },
        };
        let mut response = (self.status(), Json(body)).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", value);
            }
        }
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}
