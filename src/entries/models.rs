//! Data models for allowlist entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::vault::{OpenedToken, StoredToken};

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size for list queries.
pub const MAX_LIMIT: i64 = 200;

/// A stored allowlist entry. The token is kept in its persisted form.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub panel_url: String,
    pub token: StoredToken,
    pub active: bool,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload (token already sealed).
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub username: String,
    pub email: String,
    pub panel_url: String,
    pub token: StoredToken,
    pub active: bool,
    pub external_id: Option<String>,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub panel_url: Option<String>,
    pub token: Option<StoredToken>,
    pub active: Option<bool>,
    pub external_id: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.panel_url.is_none()
            && self.token.is_none()
            && self.active.is_none()
            && self.external_id.is_none()
    }
}

/// List filters and pagination.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryFilter {
    /// Exact email match (case-insensitive)
    pub email: Option<String>,
    /// Exact username match (case-insensitive)
    pub username: Option<String>,
    /// Email domain, e.g. `example.com`
    pub domain: Option<String>,
    /// Page size (default 50, max 200)
    pub limit: Option<i64>,
    /// Rows to skip
    pub offset: Option<i64>,
}

impl EntryFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// `@domain`, lowercased, for suffix matching against emails.
    pub fn domain_suffix(&self) -> Option<String> {
        self.domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("@{}", d.trim_start_matches('@').to_lowercase()))
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        // Unicode lowercasing, same as the normalized input and SQL LOWER()
        let eq_ci = |want: &Option<String>, have: &str| {
            want.as_deref()
                .is_none_or(|w| w.trim().to_lowercase() == have.to_lowercase())
        };
        eq_ci(&self.email, entry.email.as_str())
            && eq_ci(&self.username, entry.username.as_str())
            && self
                .domain_suffix()
                .is_none_or(|suffix| entry.email.to_lowercase().ends_with(&suffix))
    }
}

/// One page of a list query. `total` counts all matches, not just this page.
#[derive(Debug, Clone, Default)]
pub struct EntryPage {
    pub total: i64,
    pub entries: Vec<Entry>,
}

/// An entry as returned by the API, with the token opened.
///
/// `token` is `null` when no configured key can open the stored value.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "ana")]
    pub username: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "https://panel.example.com/ana")]
    pub panel_url: String,
    #[schema(value_type = Option<String>, example = "secret-token-123")]
    pub token: OpenedToken,
    pub active: bool,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntryView {
    pub fn new(entry: Entry, token: OpenedToken) -> Self {
        Self {
            id: entry.id,
            username: entry.username,
            email: entry.email,
            panel_url: entry.panel_url,
            token,
            active: entry.active,
            external_id: entry.external_id,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, email: &str) -> Entry {
        Entry {
            id: 1,
            username: username.to_string(),
            email: email.to_string(),
            panel_url: "https://panel".to_string(),
            token: StoredToken::Plain("t".to_string()),
            active: true,
            external_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_limit_and_offset_bounds() {
        let f = EntryFilter::default();
        assert_eq!(f.limit(), 50);
        assert_eq!(f.offset(), 0);

        let f = EntryFilter {
            limit: Some(1000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(f.limit(), 200);
        assert_eq!(f.offset(), 0);
    }

    #[test]
    fn test_domain_suffix() {
        let f = EntryFilter {
            domain: Some(" @Example.COM ".to_string()),
            ..Default::default()
        };
        assert_eq!(f.domain_suffix().as_deref(), Some("@example.com"));
        assert!(f.matches(&entry("ana", "ana@example.com")));
        assert!(!f.matches(&entry("bob", "bob@example.org")));
    }

    #[test]
    fn test_filter_case_insensitive() {
        let f = EntryFilter {
            username: Some("ANA".to_string()),
            ..Default::default()
        };
        assert!(f.matches(&entry("ana", "ana@example.com")));
        assert!(!f.matches(&entry("anabel", "anabel@example.com")));
    }

    #[test]
    fn test_filter_non_ascii_case_insensitive() {
        let f = EntryFilter {
            email: Some("ÉLODIE@Exemple.fr".to_string()),
            username: Some("ÉLODIE".to_string()),
            ..Default::default()
        };
        assert!(f.matches(&entry("élodie", "élodie@exemple.fr")));
    }

    #[test]
    fn test_view_serializes_null_token() {
        let view = EntryView::new(entry("ana", "ana@example.com"), OpenedToken::Unrecoverable);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["token"].is_null());
        assert_eq!(json["username"], "ana");
    }
}
