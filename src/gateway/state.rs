use std::sync::Arc;

use crate::api_auth::Authenticator;
use crate::entries::{Entry, EntryStore, EntryView};
use crate::vault::Vault;

/// Gateway application state (shared, read-only)
#[derive(Clone)]
pub struct AppState {
    /// Entry persistence
    pub store: Arc<dyn EntryStore>,
    /// Token seal/open with the configured key ring
    pub vault: Arc<Vault>,
    /// Request gate
    pub authenticator: Arc<Authenticator>,
    /// Largest request body buffered for signature checks
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntryStore>,
        vault: Arc<Vault>,
        authenticator: Arc<Authenticator>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            store,
            vault,
            authenticator,
            max_body_bytes,
        }
    }

    /// Render an entry for output, opening its token through the key ring.
    ///
    /// An unopenable token renders as `null`; the entry is still returned.
    pub fn render(&self, entry: Entry) -> EntryView {
        let token = self.vault.open_token(&entry.token);
        if !token.is_recovered() {
            tracing::warn!(
                entry_id = entry.id,
                sealed = entry.token.is_sealed(),
                "[GATEWAY] stored token unrecoverable with configured keys"
            );
        }
        EntryView::new(entry, token)
    }
}
