//! Authentication error types.
//!
//! Every failed check renders the same 401 body, whichever strategy was
//! tried and however far it got.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Gate error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 2002: Authentication failed (any reason)
    Unauthorized = 2002,
    /// 4130: Request body exceeds the configured limit
    BodyTooLarge = 4130,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BodyTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::BodyTooLarge => "request body too large",
        }
    }
}

/// Gate rejection. Carries no detail about which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthError {
    pub code: AuthErrorCode,
}

impl AuthError {
    pub fn unauthorized() -> Self {
        Self {
            code: AuthErrorCode::Unauthorized,
        }
    }

    pub fn body_too_large() -> Self {
        Self {
            code: AuthErrorCode::BodyTooLarge,
        }
    }
}

/// JSON response body for auth errors.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub code: i32,
    pub error: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            code: self.code.code(),
            error: self.code.name(),
            message: self.code.message(),
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}
