use serde::Serialize;

use crate::jwt::TokenCodec;
use crate::jwt::TokenData;
use crate::jwt::TokenError;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPair {
    fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer",
        }
    }
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Configured hasher
    /// * `token_codec` - Configured codec holding the signing secret
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue an access/refresh pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject_id` - Subject the tokens are issued for
    /// * `rotation_tag` - Subject's current rotation tag
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject_id: i64,
        rotation_tag: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_tokens(subject_id, rotation_tag)?)
    }

    /// Issue an access/refresh pair without password verification.
    ///
    /// Used after a credential change, when the caller has already proven
    /// knowledge of the password by other means.
    pub fn issue_tokens(
        &self,
        subject_id: i64,
        rotation_tag: &str,
    ) -> Result<TokenPair, TokenError> {
        let access_token = self.token_codec.issue_access(subject_id, rotation_tag)?;
        let refresh_token = self.token_codec.issue_refresh(subject_id, rotation_tag)?;

        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    pub fn issue_access_token(
        &self,
        subject_id: i64,
        rotation_tag: &str,
    ) -> Result<String, TokenError> {
        self.token_codec.issue_access(subject_id, rotation_tag)
    }

    /// Verify a token of the given kind.
    ///
    /// This does not check the rotation tag against the subject's current one.
    pub fn decode(&self, token: &str, kind: TokenKind) -> Result<TokenData, TokenError> {
        self.token_codec.decode(token, kind)
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }
}
