//! Allowlist entries: models, validation and storage.
//!
//! ## Components
//! - `models`: stored entry, insert/patch payloads, list filter, API view
//! - `validation`: required fields, sanitizing, email normalization
//! - `store`: `EntryStore` trait and `StoreError`
//! - `memory`: in-process store
//! - `repository`: PostgreSQL store
//! - `schema`: table bootstrap

pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;
pub mod validation;

pub use memory::MemoryEntryStore;
pub use models::{Entry, EntryFilter, EntryPage, EntryPatch, EntryView, NewEntry};
pub use repository::PgEntryStore;
pub use store::{EntryStore, StoreError};
pub use validation::{EntryInput, ValidEntry, ValidUpdate, ValidationError};
