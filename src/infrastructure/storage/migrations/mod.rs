//! Schema migrations for the key store and submission tables
//!
//! Applied versions are recorded in `_migrations`. Each migration runs in its
//! own transaction together with its bookkeeping row.

use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::domain::DomainError;

const MIGRATIONS_TABLE_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version BIGINT PRIMARY KEY,
        description TEXT NOT NULL,
        installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        success BOOLEAN NOT NULL DEFAULT TRUE
    )
"#;

fn storage_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("Failed to {}: {}", action, e))
}

/// PostgreSQL migrator
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(MIGRATIONS_TABLE_DDL)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("create migrations table", e))?;

        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| storage_error("open migration transaction", e))
    }

    async fn is_applied(
        tx: &mut Transaction<'static, Postgres>,
        version: i64,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| storage_error("check migration status", e))
    }

    /// Apply one migration; already-applied versions are skipped
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;
        let mut tx = self.begin().await?;

        if Self::is_applied(&mut tx, migration.version).await? {
            return Ok(false);
        }

        sqlx::raw_sql(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&format!("run migration {}", migration.version), e))?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&format!("record migration {}", migration.version), e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error(&format!("commit migration {}", migration.version), e))?;

        Ok(true)
    }

    /// Undo one migration; versions never applied are skipped
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;
        let mut tx = self.begin().await?;

        if !Self::is_applied(&mut tx, migration.version).await? {
            return Ok(false);
        }

        sqlx::raw_sql(&migration.down)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&format!("revert migration {}", migration.version), e))?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                storage_error(&format!("remove migration record {}", migration.version), e)
            })?;

        tx.commit()
            .await
            .map_err(|e| storage_error(&format!("commit revert {}", migration.version), e))?;

        Ok(true)
    }

    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        Ok(self.applied_versions().await?.last().copied())
    }

    /// Applied versions in ascending order
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT version FROM _migrations WHERE success = TRUE ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("list applied migrations", e))
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based recommended)
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Option table name used by the key store
pub const OPTIONS_TABLE: &str = "options";

/// Collection of migrations for the storage layer
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create options table",
            r#"
            CREATE TABLE IF NOT EXISTS options (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
            r#"
            DROP TABLE IF EXISTS options;
            "#,
        ),
        Migration::new(
            2,
            "Create form_submissions table",
            r#"
            CREATE TABLE IF NOT EXISTS form_submissions (
                id BIGSERIAL PRIMARY KEY,
                form_id BIGINT NOT NULL,
                submitted_at TIMESTAMP NOT NULL,
                fields JSONB NOT NULL DEFAULT '{}'::jsonb
            );
            CREATE INDEX IF NOT EXISTS idx_form_submissions_form_date
                ON form_submissions(form_id, submitted_at, id);
            "#,
            r#"
            DROP TABLE IF EXISTS form_submissions;
            "#,
        ),
        Migration::new(
            3,
            "Create form_fields table",
            r#"
            CREATE TABLE IF NOT EXISTS form_fields (
                form_id BIGINT NOT NULL,
                position INTEGER NOT NULL,
                key VARCHAR(255) NOT NULL,
                label TEXT NOT NULL DEFAULT '',
                type VARCHAR(64) NOT NULL DEFAULT 'textbox',
                PRIMARY KEY (form_id, key)
            );
            CREATE INDEX IF NOT EXISTS idx_form_fields_position ON form_fields(form_id, position);
            "#,
            r#"
            DROP TABLE IF EXISTS form_fields;
            "#,
        ),
    ]
}

/// Runs all pending storage migrations, returning the resulting version
pub async fn run_storage_migrations(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    for migration in storage_migrations() {
        if migrator.run_migration(&migration).await? {
            info!(version = migration.version, description = %migration.description, "Applied migration");
        }
    }

    migrator.current_version().await
}

/// Reverts the most recently applied storage migration, if any
pub async fn revert_last_storage_migration(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let Some(current) = migrator.current_version().await? else {
        return Ok(None);
    };

    if let Some(migration) = storage_migrations()
        .into_iter()
        .find(|m| m.version == current)
    {
        if migrator.revert_migration(&migration).await? {
            info!(version = migration.version, "Reverted migration");
        }
    }

    migrator.current_version().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creation() {
        let migration = Migration::new(1, "Test migration", "CREATE TABLE test", "DROP TABLE test");

        assert_eq!(migration.version, 1);
        assert_eq!(migration.description, "Test migration");
        assert_eq!(migration.up, "CREATE TABLE test");
        assert_eq!(migration.down, "DROP TABLE test");
    }

    #[test]
    fn test_storage_migrations_order() {
        let migrations = storage_migrations();

        assert!(!migrations.is_empty());

        for i in 1..migrations.len() {
            assert!(
                migrations[i].version > migrations[i - 1].version,
                "Migrations should be in ascending order"
            );
        }
    }

    #[test]
    fn test_storage_migrations_create_export_tables() {
        let migrations = storage_migrations();

        assert!(migrations[0].up.contains(OPTIONS_TABLE));
        assert!(migrations.iter().any(|m| m.up.contains("form_submissions")));
        assert!(migrations.iter().any(|m| m.up.contains("form_fields")));
    }

    #[test]
    fn test_storage_migrations_content() {
        let migrations = storage_migrations();

        for migration in migrations {
            assert!(!migration.description.is_empty());
            assert!(!migration.up.is_empty());
            assert!(!migration.down.is_empty());
        }
    }
}
