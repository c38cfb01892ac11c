use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use hotsox_shared::errors::{AppError, ErrorCode};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str, username: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must be at least 8 characters"));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must not be entirely numeric"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one letter"));
    }
    if password.eq_ignore_ascii_case(username) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password is too similar to the username"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("socks4ever").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("socks4ever", &hash).unwrap());
        assert!(!verify_password("socks5ever", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_internal_error() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password("socks4ever", "alice").is_ok());
        assert!(validate_password("short1", "alice").is_err());
        assert!(validate_password("1234567890", "alice").is_err());
        assert!(validate_password("!!!!????##", "alice").is_err());
        assert!(validate_password("Alice12345", "alice12345").is_err());
    }
}
