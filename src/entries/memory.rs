//! In-process entry store
//!
//! Used when no database is configured, and by tests. Reads go straight to
//! the concurrent map; writes are serialized so the uniqueness check and the
//! write happen atomically.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::models::{Entry, EntryFilter, EntryPage, EntryPatch, NewEntry};
use super::store::{EntryStore, StoreError};
use crate::conflict::{ConflictField, ConflictReport};

#[derive(Debug)]
pub struct MemoryEntryStore {
    entries: DashMap<i64, Entry>,
    next_id: AtomicI64,
    write_lock: Mutex<()>,
}

impl Default for MemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicI64::new(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields of `candidate` that collide with another entry.
    /// Must be called with `write_lock` held.
    fn conflicts(
        &self,
        skip_id: Option<i64>,
        username: &str,
        email: &str,
        external_id: Option<&str>,
    ) -> ConflictReport {
        let mut fields = Vec::new();
        for item in self.entries.iter() {
            let other = item.value();
            if Some(other.id) == skip_id {
                continue;
            }
            if other.username == username {
                fields.push(ConflictField::Username);
            }
            if other.email == email {
                fields.push(ConflictField::Email);
            }
            if external_id.is_some() && other.external_id.as_deref() == external_id {
                fields.push(ConflictField::ExternalId);
            }
        }
        ConflictReport::new(fields)
    }

    fn find_by<F>(&self, pred: F) -> Option<Entry>
    where
        F: Fn(&Entry) -> bool,
    {
        self.entries
            .iter()
            .find(|item| pred(item.value()))
            .map(|item| item.value().clone())
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        let _guard = self.write_lock.lock().await;

        let report = self.conflicts(
            None,
            &entry.username,
            &entry.email,
            entry.external_id.as_deref(),
        );
        if !report.is_empty() {
            return Err(StoreError::Conflict(report));
        }

        let now = Utc::now();
        let stored = Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: entry.username,
            email: entry.email,
            panel_url: entry.panel_url,
            token: entry.token,
            active: entry.active,
            external_id: entry.external_id,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.get(&id).map(|e| e.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError> {
        let email = email.to_lowercase();
        Ok(self.find_by(|e| e.email.to_lowercase() == email))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self.find_by(|e| e.external_id.as_deref() == Some(external_id)))
    }

    async fn list(&self, filter: &EntryFilter) -> Result<EntryPage, StoreError> {
        let mut matched: Vec<Entry> = self
            .entries
            .iter()
            .filter(|item| filter.matches(item.value()))
            .map(|item| item.value().clone())
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matched.len() as i64;
        let entries = matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect();
        Ok(EntryPage { total, entries })
    }

    async fn update(&self, id: i64, patch: EntryPatch) -> Result<Option<Entry>, StoreError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        let _guard = self.write_lock.lock().await;

        let Some(mut updated) = self.entries.get(&id).map(|e| e.value().clone()) else {
            return Ok(None);
        };

        if let Some(v) = patch.username {
            updated.username = v;
        }
        if let Some(v) = patch.email {
            updated.email = v;
        }
        if let Some(v) = patch.panel_url {
            updated.panel_url = v;
        }
        if let Some(v) = patch.token {
            updated.token = v;
        }
        if let Some(v) = patch.active {
            updated.active = v;
        }
        if let Some(v) = patch.external_id {
            updated.external_id = Some(v);
        }

        let report = self.conflicts(
            Some(id),
            &updated.username,
            &updated.email,
            updated.external_id.as_deref(),
        );
        if !report.is_empty() {
            return Err(StoreError::Conflict(report));
        }

        updated.updated_at = Utc::now();
        self.entries.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.entries.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
