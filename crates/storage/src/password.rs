//! Argon2id password hashing
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel
//! with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::StorageError;

/// Hash a plaintext password with a fresh random salt
pub(crate) fn hash_password(password: &str) -> Result<String, StorageError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::DatabaseError(format!("Password hashing failed: {}", e)))
}

/// Check a plaintext password against a stored hash
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool, StorageError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| StorageError::DatabaseError(format!("Corrupt password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(StorageError::DatabaseError(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
