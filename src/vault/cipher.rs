//! Envelope cipher for the stored secret token.
//!
//! A sealed value is `nonce (12) ‖ tag (16) ‖ ciphertext`, base64 encoded
//! for storage. AES-256-GCM with an empty associated-data field; every seal
//! draws a fresh random nonce.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Key, Nonce, Tag,
    aead::{AeadInPlace, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;

use super::error::{OpenFailure, VaultError};
use super::key::KeyMaterial;

/// AES-GCM nonce length.
pub const NONCE_SIZE: usize = 12;
/// AES-GCM authentication tag length.
pub const TAG_SIZE: usize = 16;

/// An encoded envelope produced by [`seal_with_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue(String);

impl SealedValue {
    /// Wrap an encoded envelope read back from storage. Not validated here;
    /// malformed input is reported by [`open`].
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// The token column as persisted, with its seal mode tracked explicitly.
///
/// The mode is never inferred from content: a plain token that happens to
/// look like base64 is still plain.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredToken {
    Sealed(SealedValue),
    /// Written by a deployment with no encryption key configured.
    Plain(String),
}

impl StoredToken {
    /// Rebuild from the two storage columns (`token`, `token_sealed`).
    pub fn from_parts(value: String, sealed: bool) -> Self {
        if sealed {
            Self::Sealed(SealedValue(value))
        } else {
            Self::Plain(value)
        }
    }

    /// The storage column value.
    pub fn value(&self) -> &str {
        match self {
            Self::Sealed(sealed) => sealed.as_str(),
            Self::Plain(plain) => plain,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed(_))
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sealed(sealed) => f.debug_tuple("Sealed").field(sealed).finish(),
            Self::Plain(_) => f.write_str("Plain(<redacted>)"),
        }
    }
}

/// Seal `plaintext` under `key`, or store it plain when no key is configured.
pub fn seal(plaintext: &str, key: Option<&KeyMaterial>) -> Result<StoredToken, VaultError> {
    match key {
        Some(key) => seal_with_key(plaintext, key).map(StoredToken::Sealed),
        None => Ok(StoredToken::Plain(plaintext.to_string())),
    }
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal_with_key(plaintext: &str, key: &KeyMaterial) -> Result<SealedValue, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| VaultError::Seal)?;

    let mut envelope = Vec::with_capacity(NONCE_SIZE + TAG_SIZE + buffer.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(tag.as_slice());
    envelope.extend_from_slice(&buffer);

    Ok(SealedValue(BASE64.encode(envelope)))
}

/// Decrypt an envelope with a single key.
///
/// Returns plaintext only after the tag verifies; any malformed, truncated,
/// tampered or wrong-key input is an `OpenFailure`.
pub fn open(sealed: &SealedValue, key: &KeyMaterial) -> Result<String, VaultError> {
    let raw = BASE64
        .decode(sealed.as_str())
        .map_err(|_| VaultError::Open(OpenFailure::Encoding))?;

    if raw.len() < NONCE_SIZE + TAG_SIZE {
        return Err(VaultError::Open(OpenFailure::Truncated));
    }

    let (nonce, rest) = raw.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| VaultError::Open(OpenFailure::AuthenticationFailed))?;

    String::from_utf8(buffer).map_err(|_| VaultError::Open(OpenFailure::NotUtf8))
}
