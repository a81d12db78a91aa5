use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::subject::database_error;
use crate::credential::errors::CredentialError;
use crate::credential::models::ResetRecord;
use crate::credential::ports::ResetRecordRepository;
use crate::subject::models::EmailAddress;
use crate::subject::models::RotationTag;
use crate::subject::models::SubjectId;

pub struct PostgresResetRecordRepository {
    pool: PgPool,
}

impl PostgresResetRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ResetRecordRow {
    id: Uuid,
    subject_id: i64,
    email: String,
    token: String,
    expires_at: DateTime<Utc>,
    used: bool,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResetRecordRow> for ResetRecord {
    type Error = CredentialError;

    fn try_from(row: ResetRecordRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email).map_err(|e| {
            CredentialError::DatabaseError(format!(
                "stored email of reset {} is invalid: {}",
                row.id, e
            ))
        })?;

        Ok(ResetRecord {
            id: row.id,
            subject_id: SubjectId(row.subject_id),
            email,
            token: row.token,
            expires_at: row.expires_at,
            used: row.used,
            used_at: row.used_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ResetRecordRepository for PostgresResetRecordRepository {
    async fn insert(&self, record: &ResetRecord) -> Result<(), CredentialError> {
        sqlx::query(
            r#"
            INSERT INTO password_resets
                (id, subject_id, email, token, expires_at, used, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.subject_id.as_i64())
        .bind(record.email.as_str())
        .bind(&record.token)
        .bind(record.expires_at)
        .bind(record.used)
        .bind(record.used_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ResetRecord>, CredentialError> {
        sqlx::query_as::<_, ResetRecordRow>(
            r#"
            SELECT id, subject_id, email, token, expires_at, used, used_at, created_at
            FROM password_resets
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(ResetRecord::try_from)
        .transpose()
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: String,
        rotation_tag: Option<RotationTag>,
    ) -> Result<Option<SubjectId>, CredentialError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // The row lock taken here makes concurrent redemptions of one token
        // queue up; the losers re-evaluate `used` and match nothing.
        let consumed: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE password_resets
            SET used = TRUE, used_at = $2
            WHERE token = $1 AND used = FALSE AND expires_at >= $2
            RETURNING subject_id
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some((subject_id,)) = consumed else {
            tx.rollback().await.map_err(database_error)?;
            return Ok(None);
        };

        let updated = sqlx::query(
            r#"
            UPDATE subjects
            SET password_hash = $2, rotation_tag = COALESCE($3, rotation_tag)
            WHERE id = $1
            "#,
        )
        .bind(subject_id)
        .bind(&password_hash)
        .bind(rotation_tag.as_ref().map(RotationTag::as_str))
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(database_error)?;
            return Err(CredentialError::SubjectNotFound(subject_id.to_string()));
        }

        tx.commit().await.map_err(database_error)?;
        Ok(Some(SubjectId(subject_id)))
    }
}
