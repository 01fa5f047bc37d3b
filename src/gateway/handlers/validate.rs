//! Membership check handler

use std::sync::Arc;

use axum::extract::{Query, State, rejection::QueryRejection};
use serde::Deserialize;
use utoipa::IntoParams;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ValidateData, ValidateReason, ok};
use crate::entries::validation::{normalize_email, sanitize};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ValidateQuery {
    /// Look up by email (takes precedence over `external_id`)
    pub email: Option<String>,
    /// Look up by external identifier
    #[serde(alias = "mm_uid")]
    pub external_id: Option<String>,
    /// If given, must match the entry's username (case-insensitive)
    pub username: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check whether an identity is an active member
///
/// GET /validate?email=|external_id=[&username=]
#[utoipa::path(
    get,
    path = "/validate",
    params(ValidateQuery),
    responses(
        (status = 200, description = "Membership result", body = ValidateData, content_type = "application/json"),
        (status = 400, description = "Neither email nor external_id supplied"),
        (status = 401, description = "Unauthorized")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn validate_identity(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ValidateQuery>, QueryRejection>,
) -> ApiResult<ValidateData> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let found = if let Some(email) = non_empty(query.email.as_deref()) {
        state.store.find_by_email(&normalize_email(email)).await?
    } else if let Some(external_id) = non_empty(query.external_id.as_deref()) {
        state.store.find_by_external_id(&sanitize(external_id)).await?
    } else {
        return ApiError::missing_identity().into_err();
    };

    let Some(entry) = found else {
        return ok(ValidateData::rejected(ValidateReason::NotFound));
    };
    if !entry.active {
        return ok(ValidateData::rejected(ValidateReason::Inactive));
    }
    if non_empty(query.username.as_deref())
        .is_some_and(|username| username.to_lowercase() != entry.username.to_lowercase())
    {
        return ok(ValidateData::rejected(ValidateReason::UsernameMismatch));
    }

    ok(ValidateData::member(state.render(entry)))
}
