//! Unique-constraint conflict classification.
//!
//! Maps a storage uniqueness violation to the logical fields that collided,
//! so the API can answer `409 { fields: [...] }`.
//!
//! Two paths, in order:
//! 1. structured: the violated constraint name reported by PostgreSQL,
//!    matched exactly against the known constraint identifiers
//! 2. heuristic: substring search of the constraint name, message and detail
//!    for a known column name or alias (covers other engines, e.g. SQLite's
//!    `UNIQUE constraint failed: entries.username, entries.mm_uid`)
//!
//! Classification never fails. An unrecognized violation yields an empty
//! report.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::error::ErrorKind;
use utoipa::ToSchema;

/// Fields with a uniqueness constraint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    Username,
    Email,
    ExternalId,
}

impl ConflictField {
    pub const ALL: [ConflictField; 3] = [Self::Username, Self::Email, Self::ExternalId];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::ExternalId => "external_id",
        }
    }

    /// Name of the database constraint enforcing this field.
    pub fn constraint_name(self) -> &'static str {
        match self {
            Self::Username => "entries_username_key",
            Self::Email => "entries_email_key",
            Self::ExternalId => "entries_external_id_key",
        }
    }

    /// Exact lookup by constraint name.
    pub fn from_constraint(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.constraint_name() == name)
    }

    /// Lowercase spellings that identify the field in free-text errors.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Username => &["username", "user_name"],
            Self::Email => &["email", "e_mail"],
            Self::ExternalId => &["external_id", "externalid", "external-id", "mm_uid", "mmuid"],
        }
    }
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// De-duplicated set of colliding fields. Serializes as `{ "fields": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConflictReport {
    #[schema(value_type = Vec<ConflictField>)]
    fields: BTreeSet<ConflictField>,
}

impl ConflictReport {
    pub fn new(fields: impl IntoIterator<Item = ConflictField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = ConflictField> + '_ {
        self.fields.iter().copied()
    }

    pub fn contains(&self, field: ConflictField) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Heuristic classification of free-text error detail.
pub fn classify_detail(detail: &str) -> ConflictReport {
    let detail = detail.to_ascii_lowercase();
    ConflictReport::new(
        ConflictField::ALL
            .into_iter()
            .filter(|f| f.aliases().iter().any(|alias| detail.contains(alias))),
    )
}

/// Classify from a constraint name (if the engine reports one) and any
/// free-text pieces of the error.
pub fn classify_parts(constraint: Option<&str>, texts: &[&str]) -> ConflictReport {
    if let Some(field) = constraint.and_then(ConflictField::from_constraint) {
        return ConflictReport::new([field]);
    }

    let mut fields = BTreeSet::new();
    for text in constraint.into_iter().chain(texts.iter().copied()) {
        fields.extend(classify_detail(text).fields());
    }
    ConflictReport { fields }
}

/// True if `err` is a uniqueness violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(db_err.kind(), ErrorKind::UniqueViolation),
        _ => false,
    }
}

/// Classify a storage error. Non-database errors yield an empty report.
pub fn classify(err: &sqlx::Error) -> ConflictReport {
    let sqlx::Error::Database(db_err) = err else {
        return ConflictReport::default();
    };

    let detail = db_err
        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
        .and_then(|pg| pg.detail());

    let mut texts = vec![db_err.message()];
    texts.extend(detail);

    let report = classify_parts(db_err.constraint(), &texts);
    if report.is_empty() {
        tracing::warn!(
            constraint = ?db_err.constraint(),
            "[CONFLICT] unique violation on an unrecognized constraint"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;

    #[test]
    fn test_structured_constraint() {
        let report = classify_parts(Some("entries_email_key"), &[]);
        assert_eq!(report, ConflictReport::new([ConflictField::Email]));

        let report = classify_parts(Some("entries_external_id_key"), &["irrelevant username"]);
        assert_eq!(report, ConflictReport::new([ConflictField::ExternalId]));
    }

    #[test]
    fn test_postgres_message_email() {
        let report = classify_detail(
            "duplicate key value violates unique constraint \"entries_email_key\"",
        );
        assert_eq!(report, ConflictReport::new([ConflictField::Email]));
    }

    #[test]
    fn test_sqlite_message_username_and_external_id() {
        let report = classify_detail("UNIQUE constraint failed: entries.username, entries.mm_uid");
        assert_eq!(
            report,
            ConflictReport::new([ConflictField::Username, ConflictField::ExternalId])
        );
    }

    #[test]
    fn test_index_names() {
        let report = classify_parts(
            Some("idx_entries_username"),
            &["also collides on idx_entries_external_id"],
        );
        assert_eq!(
            report,
            ConflictReport::new([ConflictField::Username, ConflictField::ExternalId])
        );
    }

    #[test]
    fn test_unrecognized_is_empty() {
        assert!(classify_detail("UNIQUE constraint failed: entries.panelUrl").is_empty());
        assert!(classify_parts(Some("entries_pkey"), &["duplicate key"]).is_empty());
    }

    #[test]
    fn test_deduplicated() {
        let report = classify_detail("Key (email)=(a@b.c) already exists; EMAIL must be unique");
        assert_eq!(report.len(), 1);
        assert!(report.contains(ConflictField::Email));
    }

    #[test]
    fn test_serialize_report() {
        let report = ConflictReport::new([ConflictField::ExternalId, ConflictField::Username]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "fields": ["username", "external_id"] })
        );
    }

    #[derive(Debug)]
    struct FakeDbError {
        message: &'static str,
        constraint: Option<&'static str>,
        kind: ErrorKind,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(message: &'static str, constraint: Option<&'static str>, kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError {
            message,
            constraint,
            kind,
        }))
    }

    #[test]
    fn test_classify_sqlx_error() {
        let err = db_error(
            "duplicate key value violates unique constraint \"entries_username_key\"",
            Some("entries_username_key"),
            ErrorKind::UniqueViolation,
        );
        assert!(is_unique_violation(&err));
        assert_eq!(classify(&err), ConflictReport::new([ConflictField::Username]));
    }

    #[test]
    fn test_classify_non_unique_errors() {
        let err = db_error("connection reset", None, ErrorKind::Other);
        assert!(!is_unique_violation(&err));
        assert!(classify(&err).is_empty());

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(classify(&sqlx::Error::RowNotFound).is_empty());
    }
}
