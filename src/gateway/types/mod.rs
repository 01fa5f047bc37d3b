//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: `ApiResponse<T>`, error codes, response DTOs
//! - [`error`]: `ApiError` and the `ApiResult` alias used by handlers

pub mod error;
pub mod response;

pub use error::{ApiError, ApiResult, created, ok};
pub use response::{
    ApiResponse, DeleteData, EntryListData, ErrorFields, ValidateData, ValidateReason,
    error_codes,
};
