//! Authentication middleware for Axum.
//!
//! Buffers the raw request body before any extractor parses it, builds a
//! [`RequestDescriptor`] and runs the [`Authenticator`]. On success the same
//! bytes are handed on to the route, so the signed body and the parsed body
//! are identical.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{OriginalUri, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use super::authenticator::{AuthDecision, RequestDescriptor};
use super::error::AuthError;
use crate::gateway::state::AppState;

/// Gate every request through the authenticator.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    // Use OriginalUri so nested routers still sign the full path + query
    let path_and_query = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| &uri.0)
        .unwrap_or(request.uri())
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, state.max_body_bytes).await.map_err(|e| {
        tracing::debug!(error = %e, "[AUTH] failed to buffer request body");
        AuthError::body_too_large()
    })?;

    let descriptor = RequestDescriptor {
        method: parts.method.as_str(),
        path_and_query: &path_and_query,
        headers: &parts.headers,
        body: &body,
        now: chrono::Utc::now().timestamp(),
    };

    match state.authenticator.authenticate(&descriptor) {
        AuthDecision::Allowed(method) => {
            tracing::trace!(?method, path = %descriptor.path(), "[AUTH] allowed");
        }
        AuthDecision::Denied(reason) => {
            tracing::debug!(?reason, method = %parts.method, path = %descriptor.path(), "[AUTH] denied");
            return Err(AuthError::unauthorized());
        }
    }

    let request = Request::from_parts(parts, Body::from(body));
    Ok(next.run(request).await)
}
