//! Entry CRUD handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResponse, ApiResult, DeleteData, EntryListData, created, ok,
};
use crate::entries::{EntryFilter, EntryInput, EntryPatch, EntryView, NewEntry};

const LIST_CACHE_CONTROL: &str = "public, max-age=30";

fn entry_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("Invalid entry id").with_fields(["id"]))
}

fn json_body(body: Result<Json<EntryInput>, JsonRejection>) -> Result<EntryInput, ApiError> {
    body.map(|Json(input)| input).map_err(|e| {
        tracing::debug!(error = %e, "[GATEWAY] rejected request body");
        ApiError::bad_request("Invalid JSON body")
    })
}

/// Create an entry
///
/// POST /entries
#[utoipa::path(
    post,
    path = "/entries",
    request_body = EntryInput,
    responses(
        (status = 201, description = "Entry created", body = EntryView, content_type = "application/json"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username, email or external_id already taken")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<EntryView> {
    let valid = json_body(body)?.validate_new()?;

    let token = state.vault.seal_token(&valid.token).map_err(|e| {
        tracing::error!(error = %e, "[GATEWAY] token seal failed");
        ApiError::internal("internal error")
    })?;

    let entry = state
        .store
        .insert(NewEntry {
            username: valid.username,
            email: valid.email,
            panel_url: valid.panel_url,
            token,
            active: valid.active,
            external_id: valid.external_id,
        })
        .await?;

    tracing::info!(entry_id = entry.id, sealed = entry.token.is_sealed(), "[GATEWAY] entry created");
    created(state.render(entry))
}

/// List entries
///
/// GET /entries?email=&username=&domain=&limit=&offset=
#[utoipa::path(
    get,
    path = "/entries",
    params(EntryFilter),
    responses(
        (status = 200, description = "Page of entries, newest first", body = EntryListData, content_type = "application/json"),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EntryFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(filter) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let page = state.store.list(&filter).await?;
    let data = EntryListData {
        total: page.total,
        entries: page.entries.into_iter().map(|e| state.render(e)).collect(),
    };

    Ok((
        StatusCode::OK,
        [(header::CACHE_CONTROL, LIST_CACHE_CONTROL)],
        Json(ApiResponse::success(data)),
    ))
}

/// Get an entry by id
///
/// GET /entries/{id}
#[utoipa::path(
    get,
    path = "/entries/{id}",
    params(("id" = i64, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Entry", body = EntryView, content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<EntryView> {
    let id = entry_id(path)?;
    match state.store.get(id).await? {
        Some(entry) => ok(state.render(entry)),
        None => ApiError::not_found("entry not found").into_err(),
    }
}

/// Update an entry
///
/// PUT /entries/{id}. Only supplied fields change; a new token is sealed
/// under the current key.
#[utoipa::path(
    put,
    path = "/entries/{id}",
    params(("id" = i64, Path, description = "Entry id")),
    request_body = EntryInput,
    responses(
        (status = 200, description = "Updated entry", body = EntryView, content_type = "application/json"),
        (status = 400, description = "No updatable fields or invalid value"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Username, email or external_id already taken")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<EntryView> {
    let id = entry_id(path)?;
    let update = json_body(body)?.validate_update()?;

    let token = update
        .token
        .as_deref()
        .map(|plain| state.vault.seal_token(plain))
        .transpose()
        .map_err(|e| {
            tracing::error!(error = %e, "[GATEWAY] token seal failed");
            ApiError::internal("internal error")
        })?;

    let patch = EntryPatch {
        username: update.username,
        email: update.email,
        panel_url: update.panel_url,
        token,
        active: update.active,
        external_id: update.external_id,
    };

    match state.store.update(id, patch).await? {
        Some(entry) => {
            tracing::info!(entry_id = entry.id, "[GATEWAY] entry updated");
            ok(state.render(entry))
        }
        None => ApiError::not_found("entry not found").into_err(),
    }
}

/// Delete an entry
///
/// DELETE /entries/{id}
#[utoipa::path(
    delete,
    path = "/entries/{id}",
    params(("id" = i64, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Whether a row was removed", body = DeleteData, content_type = "application/json"),
        (status = 401, description = "Unauthorized")
    ),
    security(("api_key" = []), ("hmac_signature" = [])),
    tag = "Entries"
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeleteData> {
    let id = entry_id(path)?;
    let deleted = state.store.delete(id).await?;
    if deleted {
        tracing::info!(entry_id = id, "[GATEWAY] entry deleted");
    }
    ok(DeleteData { deleted })
}
