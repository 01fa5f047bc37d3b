//! Key rotation resolver.
//!
//! Opens a sealed value by trying `current` first and then `previous`. A
//! value no configured key can open is reported as [`OpenedToken::Unrecoverable`]
//! instead of an error, so a read can still return the rest of the record.
//!
//! Rotation procedure: provision `previous = old current`, `current = new key`.
//! New seals use `current`; old values keep opening through `previous` until
//! they are re-sealed or `previous` is retired. Once retired, values still
//! sealed under it are permanently unrecoverable.

use serde::{Serialize, Serializer};

use super::cipher::{self, SealedValue, StoredToken};
use super::error::VaultError;
use super::key::{KeyMaterial, KeyRing};

/// Which key slot opened a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    Current,
    Previous,
}

/// Result of opening a stored token.
///
/// Serializes as the plaintext string, or `null` when unrecoverable.
#[derive(Clone, PartialEq, Eq)]
pub enum OpenedToken {
    Recovered(String),
    Unrecoverable,
}

impl OpenedToken {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Recovered(text) => Some(text),
            Self::Unrecoverable => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Recovered(text) => Some(text),
            Self::Unrecoverable => None,
        }
    }
}

impl std::fmt::Debug for OpenedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recovered(_) => f.write_str("Recovered(<redacted>)"),
            Self::Unrecoverable => f.write_str("Unrecoverable"),
        }
    }
}

impl Serialize for OpenedToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Recovered(text) => serializer.serialize_str(text),
            Self::Unrecoverable => serializer.serialize_none(),
        }
    }
}

/// Try each configured key in order, returning the plaintext and the slot
/// that opened it.
///
/// # Errors
/// The last per-key `OpenFailure`, or `NoCurrentKey` when neither slot is
/// configured.
pub fn open_with_slot(
    sealed: &SealedValue,
    current: Option<&KeyMaterial>,
    previous: Option<&KeyMaterial>,
) -> Result<(String, KeySlot), VaultError> {
    let candidates = [(KeySlot::Current, current), (KeySlot::Previous, previous)];

    let mut last_err = VaultError::NoCurrentKey;
    for (slot, key) in candidates {
        let Some(key) = key else { continue };
        match cipher::open(sealed, key) {
            Ok(plain) => return Ok((plain, slot)),
            Err(e) => {
                tracing::trace!(?slot, error = %e, "open attempt failed, trying next key");
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Open with rotation tolerance. Never fails: exhausting every key yields
/// `Unrecoverable`.
pub fn open_with_rotation(
    sealed: &SealedValue,
    current: Option<&KeyMaterial>,
    previous: Option<&KeyMaterial>,
) -> OpenedToken {
    match open_with_slot(sealed, current, previous) {
        Ok((plain, _)) => OpenedToken::Recovered(plain),
        Err(_) => OpenedToken::Unrecoverable,
    }
}

/// Open a stored token of either mode against a key ring.
///
/// Plain tokens are readable while there is no current key, since that is
/// exactly when this deployment writes them. Once a current key is set, a
/// plain token is not trusted as plaintext: it must be migrated with an
/// explicit re-seal first, so it reads as `Unrecoverable` until then.
pub fn open_stored(stored: &StoredToken, keys: &KeyRing) -> OpenedToken {
    match stored {
        StoredToken::Sealed(sealed) => {
            open_with_rotation(sealed, keys.current(), keys.previous())
        }
        StoredToken::Plain(plain) if keys.current().is_none() => {
            OpenedToken::Recovered(plain.clone())
        }
        StoredToken::Plain(_) => {
            tracing::warn!("plain token found in keyed deployment; run the re-seal migration");
            OpenedToken::Unrecoverable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::cipher::seal_with_key;

    fn key(byte: u8) -> KeyMaterial {
        KeyMaterial::from_bytes([byte; 32])
    }

    #[test]
    fn test_current_key_preferred() {
        let (a, b) = (key(1), key(2));
        let sealed = seal_with_key("tok", &a).unwrap();
        let (plain, slot) = open_with_slot(&sealed, Some(&a), Some(&b)).unwrap();
        assert_eq!(plain, "tok");
        assert_eq!(slot, KeySlot::Current);
    }

    #[test]
    fn test_previous_key_fallback() {
        let (a, b) = (key(1), key(2));
        let sealed = seal_with_key("tok", &a).unwrap();
        let (plain, slot) = open_with_slot(&sealed, Some(&b), Some(&a)).unwrap();
        assert_eq!(plain, "tok");
        assert_eq!(slot, KeySlot::Previous);
    }

    #[test]
    fn test_retired_key_unrecoverable() {
        let (a, b) = (key(1), key(2));
        let sealed = seal_with_key("tok", &a).unwrap();
        assert_eq!(
            open_with_rotation(&sealed, Some(&b), None),
            OpenedToken::Unrecoverable
        );
    }

    #[test]
    fn test_no_keys_but_sealed() {
        let sealed = seal_with_key("tok", &key(1)).unwrap();
        assert_eq!(
            open_with_slot(&sealed, None, None),
            Err(VaultError::NoCurrentKey)
        );
        assert_eq!(
            open_with_rotation(&sealed, None, None),
            OpenedToken::Unrecoverable
        );
    }

    #[test]
    fn test_only_previous_configured() {
        let a = key(1);
        let sealed = seal_with_key("tok", &a).unwrap();
        assert_eq!(
            open_with_rotation(&sealed, None, Some(&a)),
            OpenedToken::Recovered("tok".to_string())
        );
    }

    #[test]
    fn test_open_stored_plain_modes() {
        let plain = StoredToken::Plain("tok".to_string());

        let unkeyed = KeyRing::default();
        assert_eq!(
            open_stored(&plain, &unkeyed),
            OpenedToken::Recovered("tok".to_string())
        );

        let keyed = KeyRing::new(Some(key(1)), None);
        assert_eq!(open_stored(&plain, &keyed), OpenedToken::Unrecoverable);
    }

    #[test]
    fn test_open_stored_previous_only_reads_plain() {
        // No current key: new tokens are written plain and must read back
        let a = key(1);
        let ring = KeyRing::new(None, Some(a.clone()));
        assert_eq!(
            open_stored(&StoredToken::Plain("tok".to_string()), &ring),
            OpenedToken::Recovered("tok".to_string())
        );

        let sealed = StoredToken::Sealed(seal_with_key("old", &a).unwrap());
        assert_eq!(
            open_stored(&sealed, &ring),
            OpenedToken::Recovered("old".to_string())
        );
    }

    #[test]
    fn test_serialize_opened_token() {
        let recovered = serde_json::to_string(&OpenedToken::Recovered("abc".into())).unwrap();
        assert_eq!(recovered, "\"abc\"");
        let lost = serde_json::to_string(&OpenedToken::Unrecoverable).unwrap();
        assert_eq!(lost, "null");
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let token = OpenedToken::Recovered("hunter2".into());
        assert!(!format!("{:?}", token).contains("hunter2"));
    }
}
