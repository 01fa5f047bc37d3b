//! Handler error type
//!
//! `ApiError` renders the unified envelope with the matching HTTP status.
//! Internal details are logged, never returned.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::{ApiResponse, ErrorFields, error_codes};
use crate::conflict::ConflictReport;
use crate::entries::{StoreError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
    pub fields: Option<Vec<String>>,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with `data`
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with `data`
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
            fields: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn missing_identity() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::MISSING_IDENTITY,
            "missing_identity",
        )
        .with_fields(["email", "external_id"])
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn conflict(report: &ConflictReport) -> Self {
        Self::new(StatusCode::CONFLICT, error_codes::CONFLICT, "conflict")
            .with_fields(report.fields().map(|f| f.as_str()))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// Shorthand for early returns in handlers.
    pub fn into_err<T>(self) -> Result<T, ApiError> {
        Err(self)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let fields = err.fields();
        let api = ApiError::bad_request(err.to_string());
        if fields.is_empty() {
            api
        } else {
            api.with_fields(fields)
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(report) => {
                tracing::info!(fields = ?report, "[GATEWAY] write rejected by unique constraint");
                ApiError::conflict(&report)
            }
            StoreError::Database(e) => {
                tracing::error!(error = %e, "[GATEWAY] storage failure");
                ApiError::internal("internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.code,
            msg: self.msg,
            data: self.fields.map(|fields| ErrorFields { fields }),
        };
        (self.status, Json(body)).into_response()
    }
}
