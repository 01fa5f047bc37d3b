//! Input validation for entry payloads
//!
//! Strings are trimmed and truncated to `MAX_FIELD_CHARS` characters, emails
//! are lowercased, and empty optional values count as absent.

use serde::Deserialize;
use utoipa::ToSchema;

/// Maximum characters kept per string field.
pub const MAX_FIELD_CHARS: usize = 4096;

/// Fields required on create, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["username", "email", "panel_url", "token"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("No updatable fields supplied")]
    EmptyUpdate,
}

impl ValidationError {
    /// Field names reported to the caller.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::MissingFields(fields) => fields.clone(),
            Self::InvalidEmail => vec!["email"],
            Self::EmptyUpdate => Vec::new(),
        }
    }
}

/// Trim and truncate to `MAX_FIELD_CHARS` characters (not bytes).
pub fn sanitize(value: &str) -> String {
    value.trim().chars().take(MAX_FIELD_CHARS).collect()
}

/// Sanitize and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    sanitize(email).to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Sanitized, non-empty value of an optional field.
fn present(value: Option<&str>) -> Option<String> {
    value.map(sanitize).filter(|v| !v.is_empty())
}

/// Entry payload as received on create or update. Every field is optional at
/// the wire level; `validate_new` and `validate_update` enforce the rules.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EntryInput {
    #[schema(example = "ana")]
    pub username: Option<String>,
    #[schema(example = "Ana@Example.com")]
    pub email: Option<String>,
    #[schema(example = "https://panel.example.com/ana")]
    pub panel_url: Option<String>,
    #[schema(example = "secret-token-123")]
    pub token: Option<String>,
    pub active: Option<bool>,
    #[serde(alias = "mm_uid")]
    pub external_id: Option<String>,
}

/// Validated create payload. The token is still plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidEntry {
    pub username: String,
    pub email: String,
    pub panel_url: String,
    pub token: String,
    pub active: bool,
    pub external_id: Option<String>,
}

/// Validated update payload. The token, if any, is still plaintext.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ValidUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub panel_url: Option<String>,
    pub token: Option<String>,
    pub active: Option<bool>,
    pub external_id: Option<String>,
}

impl std::fmt::Debug for ValidEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidEntry")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("active", &self.active)
            .field("external_id", &self.external_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ValidUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl EntryInput {
    /// Validate a create payload.
    ///
    /// # Errors
    /// `MissingFields` lists every absent required field at once.
    pub fn validate_new(&self) -> Result<ValidEntry, ValidationError> {
        let username = present(self.username.as_deref());
        let email = present(self.email.as_deref()).map(|e| e.to_lowercase());
        let panel_url = present(self.panel_url.as_deref());
        let token = present(self.token.as_deref());

        let missing: Vec<&'static str> = [
            username.is_none(),
            email.is_none(),
            panel_url.is_none(),
            token.is_none(),
        ]
        .into_iter()
        .zip(REQUIRED_FIELDS)
        .filter_map(|(absent, name)| absent.then_some(name))
        .collect();

        let (Some(username), Some(email), Some(panel_url), Some(token)) =
            (username, email, panel_url, token)
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        if !is_plausible_email(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(ValidEntry {
            username,
            email,
            panel_url,
            token,
            active: self.active.unwrap_or(true),
            external_id: present(self.external_id.as_deref()),
        })
    }

    /// Validate a partial update. Empty strings are ignored.
    pub fn validate_update(&self) -> Result<ValidUpdate, ValidationError> {
        let update = ValidUpdate {
            username: present(self.username.as_deref()),
            email: present(self.email.as_deref()).map(|e| e.to_lowercase()),
            panel_url: present(self.panel_url.as_deref()),
            token: present(self.token.as_deref()),
            active: self.active,
            external_id: present(self.external_id.as_deref()),
        };

        if update == ValidUpdate::default() {
            return Err(ValidationError::EmptyUpdate);
        }
        if update.email.as_deref().is_some_and(|e| !is_plausible_email(e)) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(update)
    }
}
