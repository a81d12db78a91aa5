//! Credential primitives library
//!
//! Provides the leaf building blocks of the credential service:
//! - Password hashing (Argon2id) and strength policy
//! - Signed, time-bounded bearer tokens carrying a subject id and rotation tag
//! - Random rotation tags and password-reset tokens
//! - Login coordination (verify password, issue access + refresh)
//!
//! Nothing here touches persistence. Comparing a token's rotation tag with the
//! subject's current one is the caller's job.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenKind, TokenLifetimes};
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let codec = TokenCodec::new(secret, TokenLifetimes::default()).unwrap();
//! let token = codec.issue_access(42, "rotation-tag").unwrap();
//! let data = codec.decode(&token, TokenKind::Access).unwrap();
//! assert_eq!(data.subject_id, 42);
//! assert!(codec.decode(&token, TokenKind::Refresh).is_err());
//! ```
//!
//! ## Login
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenCodec, TokenLifetimes};
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let codec = TokenCodec::new(secret, TokenLifetimes::default()).unwrap();
//! let auth = Authenticator::new(PasswordHasher::new(), codec);
//!
//! let hash = auth.hash_password("password123").unwrap();
//! let pair = auth.authenticate("password123", &hash, 42, "rotation-tag").unwrap();
//! println!("Access: {}", pair.access_token);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod secrets;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::TokenCodec;
pub use jwt::TokenData;
pub use jwt::TokenError;
pub use jwt::TokenKind;
pub use jwt::TokenLifetimes;
pub use password::validate_password_strength;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use secrets::generate_reset_token;
pub use secrets::generate_rotation_tag;
