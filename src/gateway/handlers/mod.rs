//! HTTP handlers
//!
//! - `health`: liveness + store ping (public)
//! - `entries`: entry CRUD (gated)
//! - `validate`: membership check (gated)

pub mod entries;
pub mod health;
pub mod validate;

pub use entries::{create_entry, delete_entry, get_entry, list_entries, update_entry};
pub use health::{HealthResponse, health_check};
pub use validate::{ValidateQuery, validate_identity};

