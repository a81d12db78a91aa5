use std::sync::Arc;

use auth::Authenticator;
use chrono::Utc;

use crate::credential::errors::CredentialError;
use crate::subject::models::EmailAddress;
use crate::subject::models::NewSubject;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::ports::SubjectRepository;

/// Creates subjects with a hashed password and a fresh rotation tag.
///
/// Shared by public registration and the operator CLI, which is the only way
/// to create a superuser.
pub struct SubjectProvisioner<SR>
where
    SR: SubjectRepository,
{
    subjects: Arc<SR>,
    authenticator: Arc<Authenticator>,
}

impl<SR> SubjectProvisioner<SR>
where
    SR: SubjectRepository,
{
    pub fn new(subjects: Arc<SR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            subjects,
            authenticator,
        }
    }

    /// Create an active subject.
    ///
    /// # Errors
    /// * `WeakPassword` - Password violates the length policy
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    pub async fn create(
        &self,
        email: EmailAddress,
        password: &str,
        is_superuser: bool,
    ) -> Result<Subject, CredentialError> {
        auth::validate_password_strength(password)?;

        if self.subjects.find_by_email(&email).await?.is_some() {
            return Err(CredentialError::EmailAlreadyExists(email.to_string()));
        }

        let password_hash = self.authenticator.hash_password(password)?;
        let subject = self
            .subjects
            .create(NewSubject {
                email,
                password_hash,
                is_superuser,
                rotation_tag: RotationTag::generate(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            subject_id = %subject.id,
            is_superuser = subject.is_superuser,
            "Subject created"
        );
        Ok(subject)
    }
}
