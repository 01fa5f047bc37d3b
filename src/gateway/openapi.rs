//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::conflict::{ConflictField, ConflictReport};
use crate::entries::{EntryInput, EntryView};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{DeleteData, EntryListData, ErrorFields, ValidateData, ValidateReason};

/// Static key and HMAC signature security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-api-key",
                    "Shared static API key (current or previous during rotation)",
                ))),
            );
            components.add_security_scheme(
                "hmac_signature",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-signature",
                    r#"HMAC-SHA256 request signature, hex encoded. Also send x-timestamp (Unix seconds).

Signing base:
{METHOD}\n{path+query}\n{x-timestamp}\n{sha256_hex(raw body)}

Requests outside a 300 second window of server time are rejected."#,
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Allowlist Vault API",
        version = "1.0.0",
        description = "Allowlist membership service with tokens encrypted at rest.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::entries::create_entry,
        crate::gateway::handlers::entries::list_entries,
        crate::gateway::handlers::entries::get_entry,
        crate::gateway::handlers::entries::update_entry,
        crate::gateway::handlers::entries::delete_entry,
        crate::gateway::handlers::validate::validate_identity,
    ),
    components(
        schemas(
            HealthResponse,
            EntryInput,
            EntryView,
            EntryListData,
            DeleteData,
            ValidateData,
            ValidateReason,
            ErrorFields,
            ConflictField,
            ConflictReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Entries", description = "Allowlist entries and membership checks (auth required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
