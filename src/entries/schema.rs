//! Idempotent bootstrap of the `entries` table

use sqlx::PgPool;

/// Constraint names match `ConflictField::constraint_name`.
pub const CREATE_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id            BIGSERIAL PRIMARY KEY,
    username      TEXT NOT NULL,
    email         TEXT NOT NULL,
    panel_url     TEXT NOT NULL,
    token         TEXT NOT NULL,
    token_sealed  BOOLEAN NOT NULL DEFAULT FALSE,
    active        BOOLEAN NOT NULL DEFAULT TRUE,
    external_id   TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT entries_username_key UNIQUE (username),
    CONSTRAINT entries_email_key UNIQUE (email),
    CONSTRAINT entries_external_id_key UNIQUE (external_id)
)
"#;

pub const CREATE_ENTRIES_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries (created_at DESC, id DESC)";

/// Create the table and indexes if they do not exist.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing entries schema...");

    sqlx::query(CREATE_ENTRIES_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ENTRIES_CREATED_AT_INDEX)
        .execute(pool)
        .await?;

    tracing::info!("Entries schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictField;

    #[test]
    fn test_constraints_match_classifier() {
        for field in ConflictField::ALL {
            assert!(
                CREATE_ENTRIES_TABLE.contains(field.constraint_name()),
                "missing constraint for {}",
                field
            );
        }
    }

    #[test]
    fn test_seal_marker_column() {
        assert!(CREATE_ENTRIES_TABLE.contains("token_sealed"));
    }
}
