//! Token vault.
//!
//! Protects the stored secret token at rest.
//!
//! ## Components
//! - `key`: 32-byte key material and the current/previous key ring
//! - `cipher`: AES-256-GCM envelope seal/open
//! - `rotation`: current-then-previous open, `Recovered` / `Unrecoverable`
//! - `error`: vault error types

pub mod cipher;
pub mod error;
pub mod key;
pub mod rotation;

pub use cipher::{SealedValue, StoredToken, open, seal, seal_with_key};
pub use error::{OpenFailure, VaultError};
pub use key::{KEY_SIZE, KeyMaterial, KeyRing, generate_hex};
pub use rotation::{KeySlot, OpenedToken, open_stored, open_with_rotation, open_with_slot};

use crate::config::VaultConfig;

/// Outcome of re-sealing one stored token under the current key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResealOutcome {
    /// Already sealed under `current`; nothing to write.
    AlreadyCurrent,
    /// Rewritten under `current` (was plain, or sealed under `previous`).
    Resealed(StoredToken),
    /// No configured key opens it.
    Unrecoverable,
}

/// The vault: an immutable key ring built once at startup.
///
/// Shared read-only across requests; every operation is a pure function of
/// its inputs and the ring.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    keys: KeyRing,
}

impl Vault {
    pub fn new(keys: KeyRing) -> Self {
        Self { keys }
    }

    /// Build and validate the key ring from configuration.
    ///
    /// # Errors
    /// `VaultError::InvalidKey` for a malformed key. Meant to abort startup.
    pub fn from_config(config: &VaultConfig) -> Result<Self, VaultError> {
        let keys = KeyRing::from_hex(config.enc_key.as_deref(), config.enc_key_old.as_deref())?;

        if keys.current().is_none() && keys.previous().is_some() {
            tracing::warn!("[VAULT] previous key set without a current key; new tokens are stored plain");
        }
        if !keys.is_keyed() {
            tracing::warn!("[VAULT] no encryption key configured; tokens are stored plain");
        }
        Ok(Self::new(keys))
    }

    pub fn keys(&self) -> &KeyRing {
        &self.keys
    }

    /// Seal a token for persistence under the current key.
    pub fn seal_token(&self, plaintext: &str) -> Result<StoredToken, VaultError> {
        seal(plaintext, self.keys.current())
    }

    /// Open a stored token for display.
    pub fn open_token(&self, stored: &StoredToken) -> OpenedToken {
        open_stored(stored, &self.keys)
    }

    /// Re-seal a stored token under `current`.
    ///
    /// Plain tokens are sealed as-is: this is the explicit migration from
    /// unkeyed to keyed operation.
    ///
    /// # Errors
    /// `NoCurrentKey` when there is nothing to re-seal under.
    pub fn reseal(&self, stored: &StoredToken) -> Result<ResealOutcome, VaultError> {
        let current = self.keys.current().ok_or(VaultError::NoCurrentKey)?;

        let plaintext = match stored {
            StoredToken::Plain(plain) => plain.clone(),
            StoredToken::Sealed(sealed) => {
                match open_with_slot(sealed, Some(current), self.keys.previous()) {
                    Ok((_, KeySlot::Current)) => return Ok(ResealOutcome::AlreadyCurrent),
                    Ok((plain, KeySlot::Previous)) => plain,
                    Err(_) => return Ok(ResealOutcome::Unrecoverable),
                }
            }
        };

        let resealed = seal_with_key(&plaintext, current)?;
        Ok(ResealOutcome::Resealed(StoredToken::Sealed(resealed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> KeyMaterial {
        KeyMaterial::from_bytes([byte; 32])
    }

    #[test]
    fn test_from_config_rejects_bad_key() {
        let config = VaultConfig {
            enc_key: Some("deadbeef".to_string()),
            enc_key_old: None,
        };
        assert!(matches!(
            Vault::from_config(&config),
            Err(VaultError::InvalidKey { slot: "current", .. })
        ));
    }

    #[test]
    fn test_previous_only_config_round_trips_new_tokens() {
        let config = VaultConfig {
            enc_key: None,
            enc_key_old: Some("11".repeat(32)),
        };
        let vault = Vault::from_config(&config).unwrap();

        let stored = vault.seal_token("tok").unwrap();
        assert!(!stored.is_sealed());
        assert_eq!(
            vault.open_token(&stored),
            OpenedToken::Recovered("tok".to_string())
        );
    }

    #[test]
    fn test_unkeyed_vault_stores_plain() {
        let vault = Vault::default();
        let stored = vault.seal_token("tok").unwrap();
        assert!(!stored.is_sealed());
        assert_eq!(
            vault.open_token(&stored),
            OpenedToken::Recovered("tok".to_string())
        );
    }

    #[test]
    fn test_reseal_previous_to_current() {
        let old = Vault::new(KeyRing::new(Some(key(1)), None));
        let stored = old.seal_token("tok").unwrap();

        let rotated = Vault::new(KeyRing::new(Some(key(2)), Some(key(1))));
        let ResealOutcome::Resealed(resealed) = rotated.reseal(&stored).unwrap() else {
            panic!("expected re-seal");
        };

        // Survives retiring the old key
        let retired = Vault::new(KeyRing::new(Some(key(2)), None));
        assert_eq!(
            retired.open_token(&resealed),
            OpenedToken::Recovered("tok".to_string())
        );
        assert_eq!(retired.reseal(&resealed).unwrap(), ResealOutcome::AlreadyCurrent);
    }

    #[test]
    fn test_reseal_plain_migration() {
        let vault = Vault::new(KeyRing::new(Some(key(3)), None));
        let plain = StoredToken::Plain("legacy".to_string());

        assert_eq!(vault.open_token(&plain), OpenedToken::Unrecoverable);

        let ResealOutcome::Resealed(sealed) = vault.reseal(&plain).unwrap() else {
            panic!("expected re-seal");
        };
        assert!(sealed.is_sealed());
        assert_eq!(
            vault.open_token(&sealed),
            OpenedToken::Recovered("legacy".to_string())
        );
    }

    #[test]
    fn test_reseal_unrecoverable_and_no_key() {
        let stored = Vault::new(KeyRing::new(Some(key(1)), None))
            .seal_token("tok")
            .unwrap();

        let other = Vault::new(KeyRing::new(Some(key(9)), None));
        assert_eq!(other.reseal(&stored).unwrap(), ResealOutcome::Unrecoverable);

        assert_eq!(
            Vault::default().reseal(&stored),
            Err(VaultError::NoCurrentKey)
        );
    }
}
