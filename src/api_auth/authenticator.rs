//! Request authenticator.
//!
//! Evaluated fresh for every request, in this order, stopping at the first
//! success:
//! 1. public path bypass
//! 2. static API key (current or old, both valid during rotation)
//! 3. HMAC signature with timestamp, only if a shared secret is configured
//!
//! Anything else is denied. The deny reason is for server-side logs only;
//! callers always see the same response.

use axum::http::HeaderMap;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use super::public_paths::PublicPaths;
use super::signature;
use crate::config::AuthConfig;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Default replay window: 5 minutes either side of server time.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

/// Normalized view of an inbound request.
///
/// `body` must be the exact bytes received, captured before any parsing.
#[derive(Debug, Clone, Copy)]
pub struct RequestDescriptor<'a> {
    pub method: &'a str,
    /// Full path including the query string.
    pub path_and_query: &'a str,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
    /// Server wall-clock time, Unix seconds.
    pub now: i64,
}

impl<'a> RequestDescriptor<'a> {
    /// Path without the query string.
    pub fn path(&self) -> &'a str {
        self.path_and_query
            .split_once('?')
            .map_or(self.path_and_query, |(path, _)| path)
    }

    /// Header value as text; non-ASCII values read as absent.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Credentials a request presents, one per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCredential<'a> {
    StaticKey(&'a str),
    SignedRequest {
        signature: &'a str,
        timestamp: &'a str,
    },
}

impl<'a> AuthCredential<'a> {
    pub fn static_key(req: &RequestDescriptor<'a>) -> Option<Self> {
        req.header(API_KEY_HEADER).map(Self::StaticKey)
    }

    /// Both signature headers, or `None` if either is missing.
    pub fn signed_request(req: &RequestDescriptor<'a>) -> Option<Self> {
        Some(Self::SignedRequest {
            signature: req.header(SIGNATURE_HEADER)?,
            timestamp: req.header(TIMESTAMP_HEADER)?,
        })
    }
}

/// How an allowed request got through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    PublicPath,
    StaticKey,
    Hmac,
}

/// Why a request was denied. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoCredentials,
    StaticKeyMismatch,
    MissingSignatureHeaders,
    MalformedTimestamp,
    OutsideReplayWindow,
    BadSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Allowed(AuthMethod),
    Denied(DenyReason),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Static key and HMAC gate. Immutable after construction.
#[derive(Clone)]
pub struct Authenticator {
    public_paths: PublicPaths,
    current_key: Option<Zeroizing<String>>,
    old_key: Option<Zeroizing<String>>,
    hmac_secret: Option<Zeroizing<Vec<u8>>>,
    replay_window_secs: u64,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("public_paths", &self.public_paths)
            .field("static_keys", &self.static_key_count())
            .field("hmac", &self.hmac_secret.is_some())
            .field("replay_window_secs", &self.replay_window_secs)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Authenticator {
    pub fn new(
        public_paths: PublicPaths,
        current_key: Option<&str>,
        old_key: Option<&str>,
        hmac_secret: Option<&str>,
        replay_window_secs: u64,
    ) -> Self {
        Self {
            public_paths,
            current_key: non_empty(current_key).map(|k| Zeroizing::new(k.to_string())),
            old_key: non_empty(old_key).map(|k| Zeroizing::new(k.to_string())),
            hmac_secret: non_empty(hmac_secret).map(|s| Zeroizing::new(s.as_bytes().to_vec())),
            replay_window_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            PublicPaths::new(&config.public_paths),
            config.api_key.as_deref(),
            config.api_key_old.as_deref(),
            config.hmac_secret.as_deref(),
            config.replay_window_secs,
        )
    }

    pub fn public_paths(&self) -> &PublicPaths {
        &self.public_paths
    }

    pub fn static_key_count(&self) -> usize {
        usize::from(self.current_key.is_some()) + usize::from(self.old_key.is_some())
    }

    pub fn hmac_enabled(&self) -> bool {
        self.hmac_secret.is_some()
    }

    pub fn replay_window_secs(&self) -> u64 {
        self.replay_window_secs
    }

    /// Decide allow/deny for one request. Never panics.
    pub fn authenticate(&self, req: &RequestDescriptor<'_>) -> AuthDecision {
        if self.public_paths.is_public(req.path()) {
            return AuthDecision::Allowed(AuthMethod::PublicPath);
        }

        let static_presented = match AuthCredential::static_key(req) {
            Some(AuthCredential::StaticKey(presented)) => {
                if self.static_key_matches(presented) {
                    return AuthDecision::Allowed(AuthMethod::StaticKey);
                }
                true
            }
            _ => false,
        };

        let Some(secret) = self.hmac_secret.as_deref() else {
            return AuthDecision::Denied(if static_presented {
                DenyReason::StaticKeyMismatch
            } else {
                DenyReason::NoCredentials
            });
        };

        match self.verify_signed(secret, req) {
            Ok(()) => AuthDecision::Allowed(AuthMethod::Hmac),
            Err(DenyReason::MissingSignatureHeaders) if static_presented => {
                AuthDecision::Denied(DenyReason::StaticKeyMismatch)
            }
            Err(reason) => AuthDecision::Denied(reason),
        }
    }

    /// Constant-time compare against both configured keys.
    fn static_key_matches(&self, presented: &str) -> bool {
        let check = |expected: &Option<Zeroizing<String>>| -> Choice {
            match expected {
                Some(key) => presented.as_bytes().ct_eq(key.as_bytes()),
                None => Choice::from(0),
            }
        };
        // Evaluate both so timing does not reveal which slot matched
        let current = check(&self.current_key);
        let old = check(&self.old_key);
        bool::from(current | old)
    }

    fn verify_signed(&self, secret: &[u8], req: &RequestDescriptor<'_>) -> Result<(), DenyReason> {
        let Some(AuthCredential::SignedRequest {
            signature: sig,
            timestamp,
        }) = AuthCredential::signed_request(req)
        else {
            return Err(DenyReason::MissingSignatureHeaders);
        };

        let claimed: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| DenyReason::MalformedTimestamp)?;

        if req.now.abs_diff(claimed) > self.replay_window_secs {
            return Err(DenyReason::OutsideReplayWindow);
        }

        let base = signature::signing_base(req.method, req.path_and_query, timestamp, req.body);
        if signature::verify_hmac(secret, &base, sig) {
            Ok(())
        } else {
            Err(DenyReason::BadSignature)
        }
    }
}
