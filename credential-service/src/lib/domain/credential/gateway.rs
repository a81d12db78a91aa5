use std::sync::Arc;

use auth::Authenticator;
use auth::TokenData;
use auth::TokenKind;

use crate::credential::errors::CredentialError;
use crate::credential::models::AuthOutcome;
use crate::subject::models::Subject;
use crate::subject::models::SubjectId;
use crate::subject::ports::SubjectRepository;

/// Extract the token from an `Authorization` header value.
///
/// # Returns
/// None when no header was sent
///
/// # Errors
/// * `InvalidToken` - Header present but not `Bearer <token>`
pub fn bearer_token(header: Option<&str>) -> Result<Option<&str>, CredentialError> {
    let Some(value) = header else {
        return Ok(None);
    };

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| CredentialError::InvalidToken("malformed authorization header".into()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(CredentialError::InvalidToken(format!(
            "unsupported authorization scheme: {}",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialError::InvalidToken("token is empty".into()));
    }

    Ok(Some(token))
}

/// Turns bearer tokens into subjects.
///
/// A token only authenticates if it decodes, its subject exists and is active,
/// and the rotation tag it carries is still the subject's current one.
pub struct AuthenticationGateway<SR>
where
    SR: SubjectRepository,
{
    subjects: Arc<SR>,
    authenticator: Arc<Authenticator>,
}

impl<SR> AuthenticationGateway<SR>
where
    SR: SubjectRepository,
{
    pub fn new(subjects: Arc<SR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            subjects,
            authenticator,
        }
    }

    /// Resolve an access token.
    ///
    /// # Returns
    /// `Anonymous` when no token was presented
    ///
    /// # Errors
    /// * `InvalidToken` / `ExpiredToken` / `WrongKind` - Decoding failed
    /// * `SubjectNotFound` - Token subject no longer exists
    /// * `SubjectInactive` - Subject is deactivated
    /// * `TokenRevoked` - Token predates the subject's last rotation
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<AuthOutcome, CredentialError> {
        let Some(token) = bearer else {
            return Ok(AuthOutcome::Anonymous);
        };

        let subject = self.resolve(token, TokenKind::Access).await?;
        Ok(AuthOutcome::Authenticated(subject))
    }

    /// Resolve an access token that must be present.
    pub async fn require(&self, bearer: Option<&str>) -> Result<Subject, CredentialError> {
        self.authenticate(bearer)
            .await?
            .into_subject()
            .ok_or_else(|| CredentialError::InvalidToken("token is not provided".into()))
    }

    /// Resolve an access token, treating soft rejections as anonymous.
    ///
    /// Malformed or forged tokens and infrastructure failures still fail.
    pub async fn optional(&self, bearer: Option<&str>) -> Result<Option<Subject>, CredentialError> {
        match self.authenticate(bearer).await {
            Ok(outcome) => Ok(outcome.into_subject()),
            Err(e) if e.is_soft_rejection() => {
                tracing::debug!(reason = %e, "Optional authentication fell back to anonymous");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve an access token belonging to a superuser.
    ///
    /// # Errors
    /// * `PermissionDenied` - Subject lacks elevated privileges
    pub async fn require_superuser(
        &self,
        bearer: Option<&str>,
    ) -> Result<Subject, CredentialError> {
        let subject = self.require(bearer).await?;
        if !subject.is_superuser {
            tracing::warn!(subject_id = %subject.id, "Superuser access denied");
            return Err(CredentialError::PermissionDenied);
        }
        Ok(subject)
    }

    /// Apply the access-token checks to a refresh token.
    pub async fn verify_refresh(&self, refresh_token: &str) -> Result<Subject, CredentialError> {
        self.resolve(refresh_token, TokenKind::Refresh).await
    }

    async fn resolve(&self, token: &str, kind: TokenKind) -> Result<Subject, CredentialError> {
        let data = self.authenticator.decode(token, kind).map_err(|e| {
            tracing::debug!(kind = %kind, error = %e, "Token rejected");
            CredentialError::from(e)
        })?;

        self.check_subject(data).await
    }

    async fn check_subject(&self, data: TokenData) -> Result<Subject, CredentialError> {
        let id = SubjectId(data.subject_id);
        let subject = self
            .subjects
            .find_by_id(id)
            .await?
            .ok_or_else(|| CredentialError::SubjectNotFound(id.to_string()))?;

        if !subject.is_active {
            tracing::warn!(subject_id = %id, "Token presented for inactive subject");
            return Err(CredentialError::SubjectInactive);
        }

        if !subject.rotation_tag.matches(&data.rotation_tag) {
            tracing::warn!(subject_id = %id, "Token presented after credential rotation");
            return Err(CredentialError::TokenRevoked);
        }

        Ok(subject)
    }
}
