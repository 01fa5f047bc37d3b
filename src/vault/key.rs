//! Key material for the token vault.
//!
//! Keys are 32-byte AES-256 keys supplied as 64 hex characters. Two slots are
//! held at once (`current` and `previous`) so that a key can be rotated
//! without losing access to values sealed under the old one.

use std::fmt;

use zeroize::Zeroizing;

use super::error::VaultError;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;

/// A 32-byte symmetric key. Immutable once loaded; wiped on drop.
#[derive(Clone)]
pub struct KeyMaterial {
    bytes: Zeroizing<[u8; KEY_SIZE]>,
}

impl KeyMaterial {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Parse a key from its hex representation.
    ///
    /// # Errors
    /// `VaultError::InvalidKey` if the input is not valid hex or does not
    /// decode to exactly 32 bytes.
    pub fn from_hex(slot: &'static str, hex_key: &str) -> Result<Self, VaultError> {
        let decoded = Zeroizing::new(hex::decode(hex_key.trim()).map_err(|e| {
            VaultError::InvalidKey {
                slot,
                reason: format!("not valid hex: {}", e),
            }
        })?);

        let bytes: [u8; KEY_SIZE] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| VaultError::InvalidKey {
                    slot,
                    reason: format!("expected {} bytes, got {}", KEY_SIZE, decoded.len()),
                })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let key = Self::from_bytes(bytes);
        bytes.iter_mut().for_each(|b| *b = 0);
        key
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Hex form of the key, in the format `ENC_KEY` expects.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes.as_slice()))
    }
}

/// A new random key as 64 hex chars, ready to provision as `ENC_KEY`
/// (`--gen-key`).
pub fn generate_hex() -> Zeroizing<String> {
    KeyMaterial::generate().to_hex()
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// The pair of key slots consulted by the vault.
///
/// `current` seals every new value; `previous` is only ever used to open
/// values sealed before the last rotation.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    current: Option<KeyMaterial>,
    previous: Option<KeyMaterial>,
}

impl KeyRing {
    pub fn new(current: Option<KeyMaterial>, previous: Option<KeyMaterial>) -> Self {
        Self { current, previous }
    }

    /// Build the ring from optional hex strings. Empty strings count as unset.
    pub fn from_hex(current: Option<&str>, previous: Option<&str>) -> Result<Self, VaultError> {
        let parse = |slot: &'static str, value: Option<&str>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| KeyMaterial::from_hex(slot, v))
                .transpose()
        };

        Ok(Self {
            current: parse("current", current)?,
            previous: parse("previous", previous)?,
        })
    }

    pub fn current(&self) -> Option<&KeyMaterial> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&KeyMaterial> {
        self.previous.as_ref()
    }

    /// True when at least one slot is populated.
    pub fn is_keyed(&self) -> bool {
        self.current.is_some() || self.previous.is_some()
    }
}
