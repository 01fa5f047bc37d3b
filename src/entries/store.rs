//! Storage abstraction for allowlist entries

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Entry, EntryFilter, EntryPage, EntryPatch, NewEntry};
use crate::conflict::{self, ConflictReport};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0:?}")]
    Conflict(ConflictReport),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if conflict::is_unique_violation(&err) {
            StoreError::Conflict(conflict::classify(&err))
        } else {
            StoreError::Database(err)
        }
    }
}

/// Entry persistence.
///
/// Implementations enforce uniqueness of `username`, `email` and
/// `external_id` (when set) and report violations as
/// `StoreError::Conflict`. Email values arrive already normalized.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn insert(&self, entry: NewEntry) -> Result<Entry, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Entry>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Entry>, StoreError>;

    /// Filtered page, newest first.
    async fn list(&self, filter: &EntryFilter) -> Result<EntryPage, StoreError>;

    /// Apply a partial update and bump `updated_at`. `None` if no such id.
    async fn update(&self, id: i64, patch: EntryPatch) -> Result<Option<Entry>, StoreError>;

    /// `true` if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
