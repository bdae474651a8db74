/**
 * PostgreSQL Lock Record Store
 *
 * Stores lock records in the `section_locks` table (see
 * `migrations/20240301000000_section_locks.sql`). Conditional writes map
 * onto single statements, so PostgreSQL's row locking gives per-key
 * atomicity without explicit transactions:
 *
 * - `put(.., Absent)` - `INSERT .. ON CONFLICT DO NOTHING`
 * - `put(.., Revision(n))` - `UPDATE .. WHERE revision = n`
 * - `delete(.., Revision(n))` - `DELETE .. WHERE revision = n`
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::backend::locks::error::LockError;
use crate::backend::locks::store::{LockRecordStore, Precondition};
use crate::shared::LockRecord;

#[derive(sqlx::FromRow)]
struct LockRow {
    resource_id: String,
    owner_id: String,
    owner_display_name: String,
    owner_contact: String,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revision: i64,
}

impl From<LockRow> for LockRecord {
    fn from(row: LockRow) -> Self {
        Self {
            resource_id: row.resource_id,
            owner_id: row.owner_id,
            owner_display_name: row.owner_display_name,
            owner_contact: row.owner_contact,
            acquired_at: row.acquired_at,
            expires_at: row.expires_at,
            revision: row.revision,
        }
    }
}

/// Lock store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgLockStore {
    pool: PgPool,
}

impl PgLockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn unavailable(operation: &str, resource_id: &str, err: sqlx::Error) -> LockError {
    tracing::error!("[Locks] {} failed for {}: {:?}", operation, resource_id, err);
    LockError::store(err)
}

#[async_trait]
impl LockRecordStore for PgLockStore {
    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError> {
        let row = sqlx::query_as::<_, LockRow>(
            r#"
            SELECT resource_id, owner_id, owner_display_name, owner_contact,
                   acquired_at, expires_at, revision
            FROM section_locks
            WHERE resource_id = $1
            "#,
        )
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("get", resource_id, e))?;

        Ok(row.map(LockRecord::from))
    }

    async fn put(&self, record: &LockRecord, expected: Precondition) -> Result<bool, LockError> {
        let result = match expected {
            Precondition::Absent => {
                sqlx::query(
                    r#"
                    INSERT INTO section_locks
                        (resource_id, owner_id, owner_display_name, owner_contact,
                         acquired_at, expires_at, revision)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (resource_id) DO NOTHING
                    "#,
                )
                .bind(&record.resource_id)
                .bind(&record.owner_id)
                .bind(&record.owner_display_name)
                .bind(&record.owner_contact)
                .bind(record.acquired_at)
                .bind(record.expires_at)
                .bind(record.revision)
                .execute(&self.pool)
                .await
            }
            Precondition::Revision(revision) => {
                sqlx::query(
                    r#"
                    UPDATE section_locks
                    SET owner_id = $2,
                        owner_display_name = $3,
                        owner_contact = $4,
                        acquired_at = $5,
                        expires_at = $6,
                        revision = $7
                    WHERE resource_id = $1 AND revision = $8
                    "#,
                )
                .bind(&record.resource_id)
                .bind(&record.owner_id)
                .bind(&record.owner_display_name)
                .bind(&record.owner_contact)
                .bind(record.acquired_at)
                .bind(record.expires_at)
                .bind(record.revision)
                .bind(revision)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| unavailable("put", &record.resource_id, e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, resource_id: &str, expected: Precondition) -> Result<bool, LockError> {
        let revision = match expected {
            // Nothing to delete when nothing may exist.
            Precondition::Absent => return Ok(false),
            Precondition::Revision(revision) => revision,
        };

        let result = sqlx::query(
            r#"
            DELETE FROM section_locks
            WHERE resource_id = $1 AND revision = $2
            "#,
        )
        .bind(resource_id)
        .bind(revision)
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("delete", resource_id, e))?;

        Ok(result.rows_affected() == 1)
    }
}
