use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::CredentialError;
use crate::credential::errors::MailerError;
use crate::credential::models::AuthOutcome;
use crate::credential::models::MailMessage;
use crate::credential::models::ResetRecord;
use crate::subject::models::EmailAddress;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;

/// Port for credential lifecycle operations used by request handlers.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new active subject.
    ///
    /// # Errors
    /// * `WeakPassword` - Password violates the length policy
    /// * `EmailAlreadyExists` - Email is already registered
    async fn register(&self, email: EmailAddress, password: &str)
        -> Result<Subject, CredentialError>;

    /// Verify a password and issue an access/refresh pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `SubjectInactive` - Subject is deactivated
    async fn login(&self, email: &EmailAddress, password: &str)
        -> Result<TokenPair, CredentialError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// * Any token or subject rejection of the refresh token
    async fn refresh(&self, refresh_token: &str) -> Result<String, CredentialError>;

    /// Resolve an optional bearer token.
    ///
    /// # Returns
    /// `Anonymous` when no token was presented
    ///
    /// # Errors
    /// * Any token or subject rejection
    async fn authenticate(&self, bearer: Option<&str>) -> Result<AuthOutcome, CredentialError>;

    /// Resolve a bearer token that must be present and valid.
    async fn authenticate_required(&self, bearer: Option<&str>)
        -> Result<Subject, CredentialError>;

    /// Resolve a bearer token, treating soft rejections as anonymous.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed or forged token
    async fn authenticate_optional(
        &self,
        bearer: Option<&str>,
    ) -> Result<Option<Subject>, CredentialError>;

    /// Resolve a bearer token for an elevated-privilege subject.
    ///
    /// # Errors
    /// * `PermissionDenied` - Subject is not a superuser
    async fn authenticate_superuser(
        &self,
        bearer: Option<&str>,
    ) -> Result<Subject, CredentialError>;

    /// Look up a subject by id.
    ///
    /// # Errors
    /// * `SubjectNotFound` - No subject with this id
    async fn find_subject(&self, id: SubjectId) -> Result<Subject, CredentialError>;

    /// Replace the password after checking the old one. Revokes every
    /// outstanding token and returns a pair under the new rotation tag.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Old password does not match
    /// * `WeakPassword` - New password violates the length policy
    async fn change_password(
        &self,
        subject: &Subject,
        old_password: &str,
        new_password: &str,
    ) -> Result<TokenPair, CredentialError>;

    /// Revoke every outstanding token of the subject.
    async fn logout_everywhere(&self, subject: &Subject) -> Result<RotationTag, CredentialError>;

    /// Issue a reset token and mail the reset link.
    ///
    /// The link is delivered in the background and never delays the
    /// caller. Delivery failures are logged; the issued record stays valid.
    ///
    /// # Errors
    /// * `SubjectNotFound` - No subject with this email
    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<ResetRecord, CredentialError>;

    /// Redeem a reset token and set the new password.
    ///
    /// # Errors
    /// * `ResetTokenNotFound` / `ResetTokenAlreadyUsed` / `ResetTokenExpired`
    /// * `WeakPassword` - New password violates the length policy
    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        force_logout: bool,
    ) -> Result<SubjectId, CredentialError>;
}

/// Persistence operations for password-reset records.
#[async_trait]
pub trait ResetRecordRepository: Send + Sync + 'static {
    /// Persist a new live record.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, record: &ResetRecord) -> Result<(), CredentialError>;

    /// Retrieve a record by its token.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_token(&self, token: &str)
        -> Result<Option<ResetRecord>, CredentialError>;

    /// Atomically consume a live record and apply the new credentials.
    ///
    /// Marks the record used only if it is unused and unexpired at `now`, and in
    /// the same transaction stores `password_hash` (and `rotation_tag`, if given)
    /// on the owning subject. Of several concurrent calls for one token at most
    /// one returns `Some`.
    ///
    /// # Returns
    /// Owning subject id if this call consumed the record, None otherwise
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed; nothing was applied
    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: String,
        rotation_tag: Option<RotationTag>,
    ) -> Result<Option<SubjectId>, CredentialError>;
}

/// Out-of-band delivery of messages to subjects.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver a message.
    ///
    /// # Errors
    /// * `SerializationFailed` - Payload could not be encoded
    /// * `DeliveryFailed` - Relay unreachable or refused the message
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError>;
}
