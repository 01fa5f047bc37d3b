//! Allowlist Vault - allowlist membership service
//!
//! Stores identity records (username, email, secret token, external id,
//! active flag) and answers whether an identity is a current, active member.
//!
//! # Modules
//!
//! - [`vault`] - AES-256-GCM token envelopes and key rotation
//! - [`api_auth`] - Static key / HMAC request gate with public-path bypass
//! - [`conflict`] - Unique violation to colliding-field classification
//! - [`entries`] - Entry models, validation and storage
//! - [`db`] - PostgreSQL pool
//! - [`gateway`] - HTTP server, handlers and OpenAPI
//! - [`migration`] - Re-seal all stored tokens under the current key
//! - [`config`] / [`logging`] - Startup configuration and tracing setup

pub mod api_auth;
pub mod config;
pub mod conflict;
pub mod db;
pub mod entries;
pub mod gateway;
pub mod logging;
pub mod migration;
pub mod vault;

// Convenient re-exports at crate root
pub use api_auth::{AuthDecision, Authenticator, PublicPaths};
pub use conflict::{ConflictField, ConflictReport};
pub use entries::{EntryStore, MemoryEntryStore, PgEntryStore};
pub use vault::{OpenedToken, StoredToken, Vault};
