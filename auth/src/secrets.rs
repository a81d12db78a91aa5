use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use rand::RngCore;

/// Length of a subject rotation tag, in characters.
pub const ROTATION_TAG_LENGTH: usize = 31;

/// Random bytes behind a password-reset token (hex-encoded to twice this length).
pub const RESET_TOKEN_BYTES: usize = 60;

/// Generate an alphanumeric rotation tag from the OS RNG.
pub fn generate_rotation_tag() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(ROTATION_TAG_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate an opaque, URL-safe password-reset token (480 bits of entropy).
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
