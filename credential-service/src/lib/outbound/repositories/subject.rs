use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::credential::errors::CredentialError;
use crate::subject::models::EmailAddress;
use crate::subject::models::NewSubject;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;
use crate::subject::ports::SubjectRepository;

const SUBJECT_COLUMNS: &str =
    "id, email, password_hash, is_active, is_superuser, rotation_tag, last_login, created_at";

pub struct PostgresSubjectRepository {
    pool: PgPool,
}

impl PostgresSubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        bind: SubjectKey<'_>,
    ) -> Result<Option<Subject>, CredentialError> {
        let sql = format!("SELECT {} FROM subjects WHERE {}", SUBJECT_COLUMNS, predicate);
        let query = sqlx::query_as::<_, SubjectRow>(&sql);
        let query = match bind {
            SubjectKey::Id(id) => query.bind(id),
            SubjectKey::Email(email) => query.bind(email),
        };

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(Subject::try_from)
            .transpose()
    }
}

enum SubjectKey<'a> {
    Id(i64),
    Email(&'a str),
}

#[derive(Debug, FromRow)]
struct SubjectRow {
    id: i64,
    email: String,
    password_hash: String,
    is_active: bool,
    is_superuser: bool,
    rotation_tag: String,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubjectRow> for Subject {
    type Error = CredentialError;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email).map_err(|e| {
            CredentialError::DatabaseError(format!(
                "stored email of subject {} is invalid: {}",
                row.id, e
            ))
        })?;

        Ok(Subject {
            id: SubjectId(row.id),
            email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            rotation_tag: RotationTag::new(row.rotation_tag),
            last_login: row.last_login,
            created_at: row.created_at,
        })
    }
}

pub(crate) fn database_error(e: sqlx::Error) -> CredentialError {
    CredentialError::DatabaseError(e.to_string())
}

fn ensure_updated(id: SubjectId, rows_affected: u64) -> Result<(), CredentialError> {
    if rows_affected == 0 {
        return Err(CredentialError::SubjectNotFound(id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl SubjectRepository for PostgresSubjectRepository {
    async fn create(&self, subject: NewSubject) -> Result<Subject, CredentialError> {
        let sql = format!(
            r#"
            INSERT INTO subjects
                (email, password_hash, is_active, is_superuser, rotation_tag, created_at)
            VALUES ($1, $2, TRUE, $3, $4, $5)
            RETURNING {}
            "#,
            SUBJECT_COLUMNS
        );

        let row = sqlx::query_as::<_, SubjectRow>(&sql)
            .bind(subject.email.as_str())
            .bind(&subject.password_hash)
            .bind(subject.is_superuser)
            .bind(subject.rotation_tag.as_str())
            .bind(subject.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return CredentialError::EmailAlreadyExists(subject.email.to_string());
                    }
                }
                database_error(e)
            })?;

        Subject::try_from(row)
    }

    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, CredentialError> {
        self.fetch_one_where("id = $1", SubjectKey::Id(id.as_i64()))
            .await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subject>, CredentialError> {
        self.fetch_one_where("email = $1", SubjectKey::Email(email.as_str()))
            .await
    }

    async fn update_credentials(
        &self,
        id: SubjectId,
        password_hash: &str,
        rotation_tag: &RotationTag,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query(
            "UPDATE subjects SET password_hash = $2, rotation_tag = $3 WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(password_hash)
        .bind(rotation_tag.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        ensure_updated(id, result.rows_affected())
    }

    async fn update_rotation_tag(
        &self,
        id: SubjectId,
        rotation_tag: &RotationTag,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query("UPDATE subjects SET rotation_tag = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(rotation_tag.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        ensure_updated(id, result.rows_affected())
    }

    async fn update_last_login(
        &self,
        id: SubjectId,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query("UPDATE subjects SET last_login = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        ensure_updated(id, result.rows_affected())
    }
}
