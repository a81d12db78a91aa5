use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::credential::errors::CredentialError;
use crate::credential::models::ResetRecord;
use crate::credential::ports::ResetRecordRepository;
use crate::subject::models::EmailAddress;
use crate::subject::models::RotationTag;
use crate::subject::models::SubjectId;

/// Default lifetime of a reset token.
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 100;

/// Issues and redeems single-use, expiring password-reset tokens.
pub struct ResetTokenLedger<RR>
where
    RR: ResetRecordRepository,
{
    records: Arc<RR>,
    authenticator: Arc<Authenticator>,
    ttl: Duration,
}

impl<RR> ResetTokenLedger<RR>
where
    RR: ResetRecordRepository,
{
    pub fn new(records: Arc<RR>, authenticator: Arc<Authenticator>, ttl: Duration) -> Self {
        Self {
            records,
            authenticator,
            ttl,
        }
    }

    /// Create and persist a live reset record.
    ///
    /// The caller delivers `record.token` out of band.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn issue(
        &self,
        subject_id: SubjectId,
        email: EmailAddress,
    ) -> Result<ResetRecord, CredentialError> {
        let record = ResetRecord::issue(subject_id, email, self.ttl, Utc::now());
        self.records.insert(&record).await?;

        tracing::info!(
            subject_id = %subject_id,
            reset_id = %record.id,
            expires_at = %record.expires_at,
            "Password reset token issued"
        );
        Ok(record)
    }

    /// Redeem a reset token, storing the new password and, if given, a new
    /// rotation tag.
    ///
    /// The first lookup only fails fast before the password is hashed. Whether
    /// this call wins is decided by the repository's conditional consume; a
    /// losing call re-reads the record to report why.
    ///
    /// # Errors
    /// * `ResetTokenNotFound` - No record for this token
    /// * `ResetTokenAlreadyUsed` - Record already redeemed
    /// * `ResetTokenExpired` - Record expired before redemption
    /// * `WeakPassword` - New password violates the length policy
    pub async fn redeem(
        &self,
        token: &str,
        new_password: &str,
        rotation_tag: Option<RotationTag>,
    ) -> Result<SubjectId, CredentialError> {
        self.records
            .find_by_token(token)
            .await?
            .ok_or(CredentialError::ResetTokenNotFound)?
            .ensure_redeemable(Utc::now())?;

        auth::validate_password_strength(new_password)?;
        let password_hash = self.authenticator.hash_password(new_password)?;

        let now = Utc::now();
        match self
            .records
            .consume(token, now, password_hash, rotation_tag)
            .await?
        {
            Some(subject_id) => {
                tracing::info!(subject_id = %subject_id, "Password reset token redeemed");
                Ok(subject_id)
            }
            None => Err(self.explain_rejection(token, now).await),
        }
    }

    async fn explain_rejection(&self, token: &str, now: chrono::DateTime<Utc>) -> CredentialError {
        let record = match self.records.find_by_token(token).await {
            Ok(Some(record)) => record,
            Ok(None) => return CredentialError::ResetTokenNotFound,
            Err(e) => return e,
        };

        match record.ensure_redeemable(now) {
            Err(e) => {
                tracing::warn!(reset_id = %record.id, error = %e, "Reset token redemption lost");
                e
            }
            Ok(()) => {
                // Consume refused a record that still reads as live.
                tracing::warn!(reset_id = %record.id, "Reset token not consumed");
                CredentialError::ResetTokenAlreadyUsed
            }
        }
    }
}
