//! Request authentication.
//!
//! Two independent strategies guard every non-public route: a static shared
//! API key, and an HMAC-SHA256 signature over the request with a timestamp
//! replay window.
//!
//! ## Components
//! - `public_paths`: auditable list of paths that bypass authentication
//! - `signature`: signing base, body hash, HMAC sign/verify
//! - `authenticator`: allow/deny decision per request
//! - `error`: uniform denial response
//! - `middleware`: Axum middleware capturing the raw body

pub mod authenticator;
pub mod error;
pub mod middleware;
pub mod public_paths;
pub mod signature;

// Re-export for convenience
pub use authenticator::{
    API_KEY_HEADER, AuthCredential, AuthDecision, AuthMethod, Authenticator,
    DEFAULT_REPLAY_WINDOW_SECS, DenyReason, RequestDescriptor, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use error::{AuthError, AuthErrorCode};
pub use middleware::auth_middleware;
pub use public_paths::{DEFAULT_PUBLIC_PATHS, PublicPaths};
pub use signature::{body_hash, sign, signing_base, verify_hmac};
