//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - Response DTOs

use serde::Serialize;
use utoipa::ToSchema;

use crate::entries::EntryView;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success, optional detail (e.g. `fields`) on error
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Error detail naming the offending fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorFields {
    #[schema(example = json!(["email"]))]
    pub fields: Vec<String>,
}

/// One page of entries
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryListData {
    /// Matches across all pages
    #[schema(example = 1)]
    pub total: i64,
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteData {
    pub deleted: bool,
}

/// Why a membership check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidateReason {
    NotFound,
    Inactive,
    UsernameMismatch,
}

/// Membership check result
///
/// `{ok: true, entry}` or `{ok: false, reason}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateData {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidateReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryView>,
}

impl ValidateData {
    pub fn member(entry: EntryView) -> Self {
        Self {
            ok: true,
            reason: None,
            entry: Some(entry),
        }
    }

    pub fn rejected(reason: ValidateReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            entry: None,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const MISSING_IDENTITY: i32 = 1002;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;
    pub const CONFLICT: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}
