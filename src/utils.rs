use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand_core::OsRng;

use crate::errors::AppError;

/// Passwords shorter than this are rejected before hashing.
pub const PASSWORD_MIN_CHARS: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AppError::bad_request(format!(
            "password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::internal(format!("password hashing failed: {err}")))?;

    Ok(hash.to_string())
}

pub fn verify_password(candidate: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| AppError::internal(format!("stored password hash is unreadable: {err}")))?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

/// Emails match case-insensitively; fold them before storing or querying.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}
