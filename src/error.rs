//! Error taxonomy for the dashboard core.
//!
//! The aggregator and the session store raise these; the HTTP layer turns
//! them into structured failure responses.

use thiserror::Error;

/// Errors raised while turning an upload into a dashboard session.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A record reached the aggregation path malformed or incomplete.
    #[error("invalid record '{talent_id}': {reason}")]
    Validation { talent_id: String, reason: String },

    /// No usable identifiers were left after parsing.
    #[error("upload contains no talent ids")]
    EmptyUpload,

    /// Unknown or expired session id.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The uploaded file was rejected before decoding.
    #[error("invalid upload file: {0}")]
    InvalidFile(String),

    /// Malformed query string, path or request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request body over the configured upload limit.
    #[error("request body exceeds the upload limit")]
    PayloadTooLarge,

    /// The upload could not be decoded as UTF-8 or GBK.
    #[error("upload is neither UTF-8 nor GBK encoded")]
    Encoding,

    /// The record source failed to supply records.
    #[error("record source failure: {0}")]
    Source(String),

    /// Anything else. Details are logged, never returned to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// Shorthand for a validation failure.
    pub fn validation(talent_id: impl Into<String>, reason: impl Into<String>) -> Self {
        DashboardError::Validation {
            talent_id: talent_id.into(),
            reason: reason.into(),
        }
    }

    /// Message that is safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation { talent_id, reason } => {
                format!("专家数据校验失败 ({}): {}", talent_id, reason)
            }
            DashboardError::EmptyUpload => "文件中没有有效的 talent_id".to_string(),
            DashboardError::NotFound(_) => "会话不存在或已过期，请重新上传文件".to_string(),
            DashboardError::InvalidFile(reason) => reason.clone(),
            DashboardError::BadRequest(reason) => format!("请求参数无效: {}", reason),
            DashboardError::PayloadTooLarge => "文件过大，请拆分后重新上传".to_string(),
            DashboardError::Encoding => "文件编码不支持，请使用 UTF-8 或 GBK 编码".to_string(),
            DashboardError::Source(_) => "获取专家数据失败，请稍后重试".to_string(),
            DashboardError::Internal(_) => "处理文件失败，请稍后重试".to_string(),
        }
    }

    /// True for errors caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Validation { .. }
                | DashboardError::EmptyUpload
                | DashboardError::NotFound(_)
                | DashboardError::InvalidFile(_)
                | DashboardError::BadRequest(_)
                | DashboardError::PayloadTooLarge
                | DashboardError::Encoding
        )
    }
}
