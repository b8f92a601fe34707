//! Argon2id password hashing. Hashing is CPU-bound, so both operations run
//! on the blocking pool.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::domain::error::DomainError;

/// Salted PHC-format hash of `password`.
pub async fn hash_password(password: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DomainError::unknown(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| DomainError::unknown(format!("hashing task failed: {e}")))?
}

/// `false` on mismatch; a malformed stored hash is an internal error.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| DomainError::unknown(format!("stored hash is malformed: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| DomainError::unknown(format!("verification task failed: {e}")))?
}
