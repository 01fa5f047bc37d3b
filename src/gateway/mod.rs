pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_auth::auth_middleware;
use crate::config::GatewayConfig;
use state::AppState;

pub const OPENAPI_JSON_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Build the complete router.
///
/// Every route, the docs included, sits behind the auth middleware; public
/// paths are let through by the authenticator's own allowlist.
pub fn build_router(state: Arc<AppState>) -> Router {
    let entry_routes = Router::new()
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/entries/{id}",
            get(handlers::get_entry)
                .put(handlers::update_entry)
                .delete(handlers::delete_entry),
        )
        .route("/validate", get(handlers::validate_identity));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(entry_routes)
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, openapi::ApiDoc::openapi()))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let public_paths = state.authenticator.public_paths().patterns().to_vec();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}{}", addr, DOCS_PATH);
    tracing::info!(?public_paths, "Public paths (no auth)");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
