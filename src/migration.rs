//! Re-seal migration (`--reseal`)
//!
//! Rewrites every stored token under the current key: values sealed under
//! the previous key are re-sealed so that key can be retired, and plain
//! values are sealed (the one-time move from unkeyed to keyed operation).
//! Values no configured key can open are left untouched and counted.

use anyhow::{Context, bail};
use serde::Serialize;

use crate::entries::models::MAX_LIMIT;
use crate::entries::{EntryFilter, EntryPatch, EntryStore};
use crate::vault::{ResealOutcome, Vault};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResealReport {
    pub scanned: u64,
    pub resealed: u64,
    /// Already under the current key, or gone before it could be written
    pub skipped: u64,
    pub unrecoverable: u64,
}

/// Walk all entries page by page and re-seal their tokens.
///
/// # Errors
/// Fails up front if no current key is configured, and on any storage error.
pub async fn reseal_all(store: &dyn EntryStore, vault: &Vault) -> anyhow::Result<ResealReport> {
    if vault.keys().current().is_none() {
        bail!("--reseal requires a current encryption key (ENC_KEY)");
    }

    let mut report = ResealReport::default();
    let mut offset = 0;

    loop {
        let filter = EntryFilter {
            limit: Some(MAX_LIMIT),
            offset: Some(offset),
            ..Default::default()
        };
        let page = store
            .list(&filter)
            .await
            .with_context(|| format!("listing entries at offset {}", offset))?;
        if page.entries.is_empty() {
            break;
        }
        offset += page.entries.len() as i64;

        for entry in page.entries {
            report.scanned += 1;
            match vault.reseal(&entry.token)? {
                ResealOutcome::AlreadyCurrent => report.skipped += 1,
                ResealOutcome::Unrecoverable => {
                    tracing::warn!(entry_id = entry.id, "[RESEAL] token unrecoverable, left as is");
                    report.unrecoverable += 1;
                }
                ResealOutcome::Resealed(token) => {
                    let patch = EntryPatch {
                        token: Some(token),
                        ..Default::default()
                    };
                    let updated = store
                        .update(entry.id, patch)
                        .await
                        .with_context(|| format!("updating entry {}", entry.id))?;
                    if updated.is_some() {
                        report.resealed += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
            }
        }
    }

    tracing::info!(
        scanned = report.scanned,
        resealed = report.resealed,
        skipped = report.skipped,
        unrecoverable = report.unrecoverable,
        "[RESEAL] complete"
    );
    Ok(report)
}
