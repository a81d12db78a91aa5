use auth::PasswordError;
use auth::TokenError;
use auth::TokenKind;
use thiserror::Error;

use crate::subject::errors::EmailError;
use crate::subject::errors::SubjectIdError;

/// Error for mail delivery
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Failed to serialize mail: {0}")]
    SerializationFailed(String),

    #[error("Mail delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Top-level error for all credential operations
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    // Token rejections
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    ExpiredToken,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Token has been revoked")]
    TokenRevoked,

    // Subject rejections
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Subject is inactive")]
    SubjectInactive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient privileges")]
    PermissionDenied,

    // Password reset
    #[error("Reset token not found")]
    ResetTokenNotFound,

    #[error("Reset token already used")]
    ResetTokenAlreadyUsed,

    #[error("Reset token is expired")]
    ResetTokenExpired,

    // Input validation (automatically converted via #[from])
    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid subject id: {0}")]
    InvalidSubjectId(#[from] SubjectIdError),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CredentialError {
    /// Whether the error is attributable to the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Configuration(_) | Self::Password(_) | Self::DatabaseError(_)
        )
    }

    /// Rejections that optional authentication downgrades to anonymous.
    ///
    /// Malformed or forged tokens are not among them.
    pub fn is_soft_rejection(&self) -> bool {
        matches!(
            self,
            Self::ExpiredToken
                | Self::WrongKind { .. }
                | Self::TokenRevoked
                | Self::SubjectNotFound(_)
                | Self::SubjectInactive
        )
    }
}

impl From<TokenError> for CredentialError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken(msg) => CredentialError::InvalidToken(msg),
            TokenError::Expired => CredentialError::ExpiredToken,
            TokenError::WrongKind { expected, actual } => {
                CredentialError::WrongKind { expected, actual }
            }
            TokenError::EncodingFailed(_)
            | TokenError::WeakSecret { .. }
            | TokenError::InvalidLifetime(_) => CredentialError::Configuration(err.to_string()),
        }
    }
}

impl From<PasswordError> for CredentialError {
    fn from(err: PasswordError) -> Self {
        if err.is_strength_violation() {
            CredentialError::WeakPassword(err.to_string())
        } else if let PasswordError::InvalidParameters(_) = err {
            CredentialError::Configuration(err.to_string())
        } else {
            CredentialError::Password(err.to_string())
        }
    }
}
