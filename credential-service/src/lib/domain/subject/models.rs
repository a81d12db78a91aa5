use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::subject::errors::EmailError;
use crate::subject::errors::SubjectIdError;

/// Subject aggregate entity.
///
/// The identity a bearer token is issued for. `rotation_tag` is copied into every
/// token at issuance; replacing it revokes all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub rotation_tag: RotationTag,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Subject fields supplied at registration; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub email: EmailAddress,
    pub password_hash: String,
    pub is_superuser: bool,
    pub rotation_tag: RotationTag,
    pub created_at: DateTime<Utc>,
}

/// Subject unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub i64);

impl SubjectId {
    /// Parse a subject ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a decimal integer
    pub fn from_string(s: &str) -> Result<Self, SubjectIdError> {
        s.parse::<i64>()
            .map(SubjectId)
            .map_err(|e| SubjectIdError::InvalidFormat(e.to_string()))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque per-subject revocation tag.
#[derive(Clone, PartialEq, Eq)]
pub struct RotationTag(String);

impl RotationTag {
    /// Wrap a stored tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Draw a fresh high-entropy tag.
    pub fn generate() -> Self {
        Self(auth::generate_rotation_tag())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a tag carried by a token is still the current one.
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }
}

// Tags act as revocation secrets; keep them out of logs.
impl fmt::Debug for RotationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RotationTag(..)")
    }
}
