use thiserror::Error;

use super::claims::TokenKind;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    Expired,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Signing secret too short: minimum {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),
}

impl TokenError {
    /// Whether the error comes from codec setup or signing rather than from the presented token.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EncodingFailed(_) | Self::WeakSecret { .. } | Self::InvalidLifetime(_)
        )
    }
}
