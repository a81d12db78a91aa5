pub mod argon2;
pub mod errors;

pub use argon2::validate_password_strength;
pub use argon2::PasswordHasher;
pub use errors::PasswordError;
