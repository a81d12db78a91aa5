use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenData;
use super::claims::TokenKind;
use super::errors::TokenError;

/// Minimum signing secret length for HS256.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound on accepted clock skew.
pub const MAX_LEEWAY_SECONDS: i64 = 60;

/// Validity windows for issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub leeway: Duration,
}

impl TokenLifetimes {
    /// Build lifetimes from configured units.
    ///
    /// # Errors
    /// * `InvalidLifetime` - A value does not fit in a `Duration`
    pub fn new(
        access_minutes: i64,
        refresh_days: i64,
        leeway_seconds: i64,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            access: Duration::try_minutes(access_minutes)
                .ok_or_else(|| out_of_range("access lifetime", access_minutes))?,
            refresh: Duration::try_days(refresh_days)
                .ok_or_else(|| out_of_range("refresh lifetime", refresh_days))?,
            leeway: Duration::try_seconds(leeway_seconds)
                .ok_or_else(|| out_of_range("leeway", leeway_seconds))?,
        })
    }

    fn validate(&self) -> Result<(), TokenError> {
        if self.access <= Duration::zero() || self.refresh <= Duration::zero() {
            return Err(TokenError::InvalidLifetime(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.leeway < Duration::zero() || self.leeway > Duration::seconds(MAX_LEEWAY_SECONDS) {
            return Err(TokenError::InvalidLifetime(format!(
                "leeway must be between 0 and {} seconds",
                MAX_LEEWAY_SECONDS
            )));
        }
        Ok(())
    }

    fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(30),
            refresh: Duration::days(7),
            leeway: Duration::zero(),
        }
    }
}

fn out_of_range(what: &str, value: i64) -> TokenError {
    TokenError::InvalidLifetime(format!("{} of {} is out of range", what, value))
}

/// Signs and verifies bearer tokens.
///
/// Uses HS256 (HMAC with SHA-256). Expiry is checked against an explicit clock
/// after the signature has been verified, so the skew tolerance is exactly
/// `TokenLifetimes::leeway`.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetimes: TokenLifetimes,
}

impl TokenCodec {
    /// Create a codec from a signing secret.
    ///
    /// # Arguments
    /// * `secret` - Shared HMAC secret, at least 32 bytes
    /// * `lifetimes` - Access/refresh validity and clock leeway
    ///
    /// # Errors
    /// * `WeakSecret` - Secret shorter than `MIN_SECRET_LENGTH`
    /// * `InvalidLifetime` - Non-positive lifetime or leeway out of bounds
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }
        lifetimes.validate()?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetimes,
        })
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    /// Issue a short-lived access token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access(&self, subject_id: i64, rotation_tag: &str) -> Result<String, TokenError> {
        self.issue_access_at(subject_id, rotation_tag, Utc::now().timestamp())
    }

    /// Issue a long-lived refresh token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_refresh(&self, subject_id: i64, rotation_tag: &str) -> Result<String, TokenError> {
        self.issue_refresh_at(subject_id, rotation_tag, Utc::now().timestamp())
    }

    pub fn issue_access_at(
        &self,
        subject_id: i64,
        rotation_tag: &str,
        now: i64,
    ) -> Result<String, TokenError> {
        self.issue(subject_id, rotation_tag, TokenKind::Access, now)
    }

    pub fn issue_refresh_at(
        &self,
        subject_id: i64,
        rotation_tag: &str,
        now: i64,
    ) -> Result<String, TokenError> {
        self.issue(subject_id, rotation_tag, TokenKind::Refresh, now)
    }

    fn issue(
        &self,
        subject_id: i64,
        rotation_tag: &str,
        kind: TokenKind,
        now: i64,
    ) -> Result<String, TokenError> {
        let lifetime = self.lifetimes.for_kind(kind);
        let claims = Claims::new(subject_id, rotation_tag, kind, now, lifetime.num_seconds());
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its contents.
    ///
    /// # Arguments
    /// * `token` - Signed token string
    /// * `expected` - Kind the caller requires
    ///
    /// # Errors
    /// * `InvalidToken` - Empty, malformed, badly signed, or missing the kind discriminator
    /// * `Expired` - `exp` plus leeway has passed
    /// * `WrongKind` - Token kind differs from `expected`
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenData, TokenError> {
        self.decode_at(token, expected, Utc::now().timestamp())
    }

    pub fn decode_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: i64,
    ) -> Result<TokenData, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::InvalidToken("token is empty".to_string()));
        }

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?
            .claims;

        if claims.is_expired(now, self.lifetimes.leeway.num_seconds()) {
            return Err(TokenError::Expired);
        }

        if claims.token_type != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.token_type,
            });
        }

        TokenData::try_from(claims)
    }
}
