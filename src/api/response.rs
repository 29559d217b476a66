//! Response bodies and error mapping for the HTTP API.

use crate::error::DashboardError;
use crate::models::{ExpertRecord, StatisticsSummary};
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body returned by a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub talent_count: usize,
    pub session_id: String,
}

/// Body returned by a successful dashboard fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub message: String,
    pub stats: StatisticsSummary,
}

/// Body returned by the paginated expert listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertsResponse {
    pub success: bool,
    pub total: usize,
    pub data: Vec<ExpertRecord>,
}

/// Body returned by the health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub sessions: usize,
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

/// Wraps a [`DashboardError`] so handlers can return it directly.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(DashboardError::BadRequest(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(DashboardError::BadRequest(rejection.body_text()))
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError(DashboardError::PayloadTooLarge)
        } else {
            ApiError(DashboardError::BadRequest(rejection.body_text()))
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Validation { .. }
            | DashboardError::EmptyUpload
            | DashboardError::InvalidFile(_)
            | DashboardError::BadRequest(_)
            | DashboardError::Encoding => StatusCode::BAD_REQUEST,
            DashboardError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            DashboardError::Source(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!("Request rejected ({}): {}", status.as_u16(), self.0);
        } else {
            error!("Request failed ({}): {}", status.as_u16(), self.0);
        }

        let body = FailureResponse {
            success: false,
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DashboardError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DashboardError::EmptyUpload, StatusCode::BAD_REQUEST),
            (DashboardError::Encoding, StatusCode::BAD_REQUEST),
            (DashboardError::BadRequest("q".into()), StatusCode::BAD_REQUEST),
            (DashboardError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (DashboardError::validation("t", "r"), StatusCode::BAD_REQUEST),
            (DashboardError::Source("down".into()), StatusCode::BAD_GATEWAY),
            (
                DashboardError::Internal("bug".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn test_failure_response_shape() {
        let response = ApiError(DashboardError::EmptyUpload).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
