use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::AuthenticationError;
use auth::TokenPair;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use tracing::Instrument;

use crate::credential::errors::CredentialError;
use crate::credential::gateway::AuthenticationGateway;
use crate::credential::ledger::ResetTokenLedger;
use crate::credential::ledger::DEFAULT_RESET_TTL_MINUTES;
use crate::credential::models::AuthOutcome;
use crate::credential::models::MailMessage;
use crate::credential::models::ResetRecord;
use crate::credential::ports::CredentialServicePort;
use crate::credential::ports::Mailer;
use crate::credential::ports::ResetRecordRepository;
use crate::credential::provisioning::SubjectProvisioner;
use crate::credential::rotation::CredentialRotationPolicy;
use crate::subject::models::EmailAddress;
use crate::subject::models::RotationTag;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;
use crate::subject::ports::SubjectRepository;

pub const RESET_REQUEST_MAIL_SUBJECT: &str = "Forgot password request";
pub const PASSWORD_CHANGED_MAIL_SUBJECT: &str = "New password set";

/// Password-reset settings.
#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Lifetime of an issued reset token
    pub ttl: Duration,

    /// Page the mailed link points to; the token is appended as `?token=`
    pub url: String,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_RESET_TTL_MINUTES),
            url: "http://localhost:3000/forgot-password".to_string(),
        }
    }
}

/// Domain service implementation for credential operations.
///
/// Composes the gateway, the rotation policy and the reset ledger over
/// the same subject store.
pub struct CredentialService<SR, RR, M>
where
    SR: SubjectRepository,
    RR: ResetRecordRepository,
    M: Mailer,
{
    subjects: Arc<SR>,
    mailer: Arc<M>,
    authenticator: Arc<Authenticator>,
    gateway: AuthenticationGateway<SR>,
    rotation: CredentialRotationPolicy<SR>,
    provisioner: SubjectProvisioner<SR>,
    ledger: ResetTokenLedger<RR>,
    reset_url: String,
}

impl<SR, RR, M> CredentialService<SR, RR, M>
where
    SR: SubjectRepository,
    RR: ResetRecordRepository,
    M: Mailer,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `subjects` - Subject persistence implementation
    /// * `records` - Reset record persistence implementation
    /// * `mailer` - Out-of-band delivery implementation
    /// * `authenticator` - Password hasher and token codec
    /// * `reset` - Reset token lifetime and link target
    pub fn new(
        subjects: Arc<SR>,
        records: Arc<RR>,
        mailer: Arc<M>,
        authenticator: Arc<Authenticator>,
        reset: ResetSettings,
    ) -> Self {
        Self {
            gateway: AuthenticationGateway::new(
                Arc::clone(&subjects),
                Arc::clone(&authenticator),
            ),
            rotation: CredentialRotationPolicy::new(Arc::clone(&subjects)),
            provisioner: SubjectProvisioner::new(
                Arc::clone(&subjects),
                Arc::clone(&authenticator),
            ),
            ledger: ResetTokenLedger::new(records, Arc::clone(&authenticator), reset.ttl),
            subjects,
            mailer,
            authenticator,
            reset_url: reset.url,
        }
    }

    /// Hand a message to the mailer in the background. Failures are logged.
    fn deliver(&self, message: MailMessage) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(
            async move {
                if let Err(e) = mailer.send(&message).await {
                    tracing::error!(
                        mail_subject = %message.subject,
                        error = %e,
                        "Failed to deliver mail"
                    );
                }
            }
            .in_current_span(),
        );
    }

    fn issue_pair(&self, id: SubjectId, tag: &RotationTag) -> Result<TokenPair, CredentialError> {
        Ok(self.authenticator.issue_tokens(id.as_i64(), tag.as_str())?)
    }
}

#[async_trait]
impl<SR, RR, M> CredentialServicePort for CredentialService<SR, RR, M>
where
    SR: SubjectRepository,
    RR: ResetRecordRepository,
    M: Mailer,
{
    async fn register(
        &self,
        email: EmailAddress,
        password: &str,
    ) -> Result<Subject, CredentialError> {
        self.provisioner.create(email, password, false).await
    }

    async fn login(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<TokenPair, CredentialError> {
        let Some(subject) = self.subjects.find_by_email(email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        let pair = self
            .authenticator
            .authenticate(
                password,
                &subject.password_hash,
                subject.id.as_i64(),
                subject.rotation_tag.as_str(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(subject_id = %subject.id, "Login with wrong password");
                    CredentialError::InvalidCredentials
                }
                AuthenticationError::PasswordError(e) => e.into(),
                AuthenticationError::TokenError(e) => e.into(),
            })?;

        if !subject.is_active {
            tracing::warn!(subject_id = %subject.id, "Login for inactive subject");
            return Err(CredentialError::SubjectInactive);
        }

        if let Err(e) = self.subjects.update_last_login(subject.id, Utc::now()).await {
            tracing::error!(
                subject_id = %subject.id,
                error = %e,
                "Failed to record last login"
            );
        }

        tracing::info!(subject_id = %subject.id, "Subject logged in");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, CredentialError> {
        let subject = self.gateway.verify_refresh(refresh_token).await?;
        let access_token = self
            .authenticator
            .issue_access_token(subject.id.as_i64(), subject.rotation_tag.as_str())?;

        tracing::debug!(subject_id = %subject.id, "Access token refreshed");
        Ok(access_token)
    }

    async fn authenticate(&self, bearer: Option<&str>) -> Result<AuthOutcome, CredentialError> {
        self.gateway.authenticate(bearer).await
    }

    async fn authenticate_required(
        &self,
        bearer: Option<&str>,
    ) -> Result<Subject, CredentialError> {
        self.gateway.require(bearer).await
    }

    async fn authenticate_optional(
        &self,
        bearer: Option<&str>,
    ) -> Result<Option<Subject>, CredentialError> {
        self.gateway.optional(bearer).await
    }

    async fn authenticate_superuser(
        &self,
        bearer: Option<&str>,
    ) -> Result<Subject, CredentialError> {
        self.gateway.require_superuser(bearer).await
    }

    async fn find_subject(&self, id: SubjectId) -> Result<Subject, CredentialError> {
        self.subjects
            .find_by_id(id)
            .await?
            .ok_or_else(|| CredentialError::SubjectNotFound(id.to_string()))
    }

    async fn change_password(
        &self,
        subject: &Subject,
        old_password: &str,
        new_password: &str,
    ) -> Result<TokenPair, CredentialError> {
        if !self
            .authenticator
            .verify_password(old_password, &subject.password_hash)?
        {
            tracing::warn!(
                subject_id = %subject.id,
                "Password change with wrong old password"
            );
            return Err(CredentialError::InvalidCredentials);
        }

        auth::validate_password_strength(new_password)?;
        let password_hash = self.authenticator.hash_password(new_password)?;

        let tag = self
            .rotation
            .rotate_with_password(subject.id, &password_hash)
            .await?;

        tracing::info!(subject_id = %subject.id, "Password changed");
        self.issue_pair(subject.id, &tag)
    }

    async fn logout_everywhere(&self, subject: &Subject) -> Result<RotationTag, CredentialError> {
        self.rotation.rotate(subject.id).await
    }

    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<ResetRecord, CredentialError> {
        let subject = self
            .subjects
            .find_by_email(email)
            .await?
            .ok_or_else(|| CredentialError::SubjectNotFound(email.to_string()))?;

        let record = self.ledger.issue(subject.id, subject.email.clone()).await?;

        let link = format!("{}?token={}", self.reset_url, record.token);
        self.deliver(MailMessage::new(
            record.email.clone(),
            RESET_REQUEST_MAIL_SUBJECT,
            json!({ "url": link }),
        ));

        Ok(record)
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        force_logout: bool,
    ) -> Result<SubjectId, CredentialError> {
        let tag = force_logout.then(|| self.rotation.next_tag());
        let subject_id = self.ledger.redeem(token, new_password, tag).await?;

        match self.subjects.find_by_id(subject_id).await {
            Ok(Some(subject)) => self.deliver(MailMessage::new(
                subject.email,
                PASSWORD_CHANGED_MAIL_SUBJECT,
                json!({}),
            )),
            Ok(None) => {
                tracing::warn!(subject_id = %subject_id, "Reset subject vanished before notice")
            }
            Err(e) => tracing::error!(
                subject_id = %subject_id,
                error = %e,
                "Failed to load subject for notice"
            ),
        }

        Ok(subject_id)
    }
}
