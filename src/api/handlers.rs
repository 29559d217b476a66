//! Request handlers.

use crate::api::response::{
    ApiError, DashboardResponse, ExpertsResponse, HealthResponse, UploadResponse,
};
use crate::api::AppState;
use crate::error::DashboardError;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

// Extractors are taken as `Result` so their rejections go through `ApiError`
// and come back in the JSON failure envelope.

/// `POST /api/upload?filename=...` with the raw file as the body.
pub async fn upload(
    State(state): State<AppState>,
    params: Result<Query<UploadParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Query(params) = params?;
    let body = body?;
    let filename = params
        .filename
        .ok_or_else(|| DashboardError::InvalidFile("缺少文件名".to_string()))?;

    let outcome = state.service.upload(&filename, &body).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!("成功解析 {} 位专家数据", outcome.talent_count),
        talent_count: outcome.talent_count,
        session_id: outcome.session_id,
    }))
}

/// `GET /api/dashboard/:session_id`
pub async fn dashboard(
    State(state): State<AppState>,
    session_id: Result<Path<String>, PathRejection>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let Path(session_id) = session_id?;
    let stats = state.service.dashboard(&session_id)?;

    Ok(Json(DashboardResponse {
        success: true,
        message: "获取成功".to_string(),
        stats,
    }))
}

/// `GET /api/dashboard/:session_id/experts?offset=&limit=`
pub async fn experts(
    State(state): State<AppState>,
    session_id: Result<Path<String>, PathRejection>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<ExpertsResponse>, ApiError> {
    let Path(session_id) = session_id?;
    let Query(page) = page?;
    let page = state.service.experts(&session_id, page.offset, page.limit)?;

    Ok(Json(ExpertsResponse {
        success: true,
        total: page.total,
        data: page.records,
    }))
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "expert-dashboard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.service.store().len(),
    })
}
