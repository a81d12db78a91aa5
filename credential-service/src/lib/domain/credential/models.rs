use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::credential::errors::CredentialError;
use crate::subject::models::EmailAddress;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;

/// One password-reset attempt.
///
/// Live until it is either redeemed or its expiry passes; both are terminal.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetRecord {
    pub id: Uuid,
    pub subject_id: SubjectId,
    pub email: EmailAddress,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Redemption state of a reset record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStatus {
    Live,
    Used,
    Expired,
}

impl ResetRecord {
    /// Create a fresh live record with a random token.
    pub fn issue(
        subject_id: SubjectId,
        email: EmailAddress,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            email,
            token: auth::generate_reset_token(),
            expires_at: now + ttl,
            used: false,
            used_at: None,
            created_at: now,
        }
    }

    /// Used takes precedence over expired.
    pub fn status(&self, now: DateTime<Utc>) -> ResetStatus {
        if self.used {
            ResetStatus::Used
        } else if now > self.expires_at {
            ResetStatus::Expired
        } else {
            ResetStatus::Live
        }
    }

    /// Fail with the matching reset error unless the record is live.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), CredentialError> {
        match self.status(now) {
            ResetStatus::Live => Ok(()),
            ResetStatus::Used => Err(CredentialError::ResetTokenAlreadyUsed),
            ResetStatus::Expired => Err(CredentialError::ResetTokenExpired),
        }
    }
}

impl fmt::Debug for ResetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetRecord")
            .field("id", &self.id)
            .field("subject_id", &self.subject_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .field("used", &self.used)
            .field("used_at", &self.used_at)
            .finish_non_exhaustive()
    }
}

/// Result of resolving a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Anonymous,
    Authenticated(Subject),
}

impl AuthOutcome {
    pub fn into_subject(self) -> Option<Subject> {
        match self {
            AuthOutcome::Anonymous => None,
            AuthOutcome::Authenticated(subject) => Some(subject),
        }
    }
}

/// Outgoing message handed to the delivery collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub recipients: Vec<EmailAddress>,
    pub subject: String,
    pub payload: serde_json::Value,
}

impl MailMessage {
    pub fn new(
        recipient: EmailAddress,
        subject: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            recipients: vec![recipient],
            subject: subject.into(),
            payload,
        }
    }
}
