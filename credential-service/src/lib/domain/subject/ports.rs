use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::CredentialError;
use crate::subject::models::EmailAddress;
use crate::subject::models::NewSubject;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;

/// Persistence operations for the subject aggregate.
#[async_trait]
pub trait SubjectRepository: Send + Sync + 'static {
    /// Persist a new subject.
    ///
    /// # Returns
    /// Created subject with its assigned id
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, subject: NewSubject) -> Result<Subject, CredentialError>;

    /// Retrieve subject by identifier.
    ///
    /// # Returns
    /// Optional subject (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Subject>, CredentialError>;

    /// Retrieve subject by email address.
    ///
    /// # Returns
    /// Optional subject (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Subject>, CredentialError>;

    /// Replace the stored password hash and rotation tag in one write.
    ///
    /// # Errors
    /// * `SubjectNotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_credentials(
        &self,
        id: SubjectId,
        password_hash: &str,
        rotation_tag: &RotationTag,
    ) -> Result<(), CredentialError>;

    /// Replace the rotation tag, revoking every token issued under the old one.
    ///
    /// # Errors
    /// * `SubjectNotFound` - Subject does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_rotation_tag(
        &self,
        id: SubjectId,
        rotation_tag: &RotationTag,
    ) -> Result<(), CredentialError>;

    /// Record a successful login.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_last_login(
        &self,
        id: SubjectId,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialError>;
}
