//! Credential hashing.
//!
//! Passwords are hashed with bcrypt (salted, fixed work factor). Hashing is
//! CPU-bound, so callers run these functions on the blocking pool.

use crate::constants::BCRYPT_COST;

/// Hash a plaintext password for storage
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Check a plaintext password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
