//! Vault error types.

use thiserror::Error;

/// Errors raised by the token vault.
///
/// `InvalidKey` is a startup failure: keys are validated once when the vault
/// is built and never again at request time. `Open` is recovered locally by
/// the rotation resolver, which moves on to the next key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("invalid {slot} encryption key: {reason}")]
    InvalidKey { slot: &'static str, reason: String },

    #[error("failed to seal value")]
    Seal,

    #[error("failed to open sealed value: {0}")]
    Open(OpenFailure),

    #[error("no current encryption key configured")]
    NoCurrentKey,
}

/// Why a single open attempt failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    /// Not valid base64.
    #[error("malformed envelope encoding")]
    Encoding,
    /// Shorter than nonce + tag.
    #[error("envelope too short")]
    Truncated,
    /// Tag did not verify: wrong key or tampered bytes.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// Authenticated, but the plaintext is not UTF-8.
    #[error("plaintext is not valid UTF-8")]
    NotUtf8,
}
