use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Discriminator carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims signed into a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject id, decimal
    pub sub: String,

    /// Rotation tag of the subject at issuance
    pub rstr: String,

    pub token_type: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject.
    ///
    /// # Arguments
    /// * `subject_id` - Numeric subject identifier
    /// * `rotation_tag` - Subject's current rotation tag
    /// * `kind` - Access or refresh
    /// * `issued_at` - Unix timestamp of issuance
    /// * `lifetime_seconds` - Seconds until expiry
    pub fn new(
        subject_id: i64,
        rotation_tag: impl Into<String>,
        kind: TokenKind,
        issued_at: i64,
        lifetime_seconds: i64,
    ) -> Self {
        Self {
            sub: subject_id.to_string(),
            rstr: rotation_tag.into(),
            token_type: kind,
            iat: issued_at,
            exp: issued_at + lifetime_seconds,
        }
    }

    /// Parse the subject id.
    ///
    /// # Errors
    /// * `InvalidToken` - `sub` is not a decimal id
    pub fn subject_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidToken("subject is not a numeric id".to_string()))
    }

    /// Check if token is expired at `now`, tolerating `leeway_seconds` of skew.
    pub fn is_expired(&self, now: i64, leeway_seconds: i64) -> bool {
        self.exp + leeway_seconds < now
    }
}

/// Verified contents of a decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub subject_id: i64,
    pub rotation_tag: String,
    pub kind: TokenKind,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl TryFrom<Claims> for TokenData {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            subject_id: claims.subject_id()?,
            rotation_tag: claims.rstr,
            kind: claims.token_type,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
