//! Password hashing port.

use crate::error::Result;

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash. Malformed hashes
    /// never verify.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
