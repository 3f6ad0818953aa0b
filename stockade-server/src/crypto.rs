//! Cryptographic utilities for the server

use rand::Rng;

use crate::error::ServerError;

/// Default bcrypt cost factor
pub const BCRYPT_COST: u32 = 12;

/// Minimum password length for provisioned accounts
pub const PASSWORD_MIN_LENGTH: usize = 12;
/// Maximum password length for provisioned accounts
pub const PASSWORD_MAX_LENGTH: usize = 100;

/// Symbols accepted by the password policy
const PASSWORD_SYMBOLS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Verify a password against a bcrypt hash
///
/// The digest comparison inside bcrypt is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

/// Generate a fixed-length numeric login code
pub fn generate_login_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Check a candidate password against the provisioning policy: length
/// bounds plus at least one lowercase letter, uppercase letter, digit,
/// and symbol.
pub fn validate_password(password: &str) -> Result<(), ServerError> {
    if password.len() < PASSWORD_MIN_LENGTH || password.len() > PASSWORD_MAX_LENGTH {
        return Err(ServerError::validation(format!(
            "password must be between {} and {} characters",
            PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH
        )));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(&c));

    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(ServerError::validation(
            "password must contain a lowercase letter, an uppercase letter, a digit, and a symbol",
        ));
    }

    Ok(())
}
