//! Argon2id password hashing and verification.
//!
//! Hashes use the Argon2id variant with a random salt from [`OsRng`] and are
//! stored in PHC string format, so the cost parameters and salt travel with
//! the hash and older hashes still verify after the configured cost changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::PasswordCost;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("stored password hash is corrupt: {0}")]
    Corrupt(password_hash::Error),

    #[error("password hashing failed: {0}")]
    Hashing(password_hash::Error),

    #[error("invalid argon2 parameters: {0}")]
    Params(argon2::Error),
}

/// Hashes and verifies passwords. Implementations are CPU-bound and synchronous.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check `candidate` against a stored hash.
    ///
    /// [`PasswordError::Mismatch`] when the password is wrong,
    /// [`PasswordError::Corrupt`] when `stored` is not a parsable hash.
    fn verify(&self, candidate: &str, stored: &str) -> Result<(), PasswordError>;
}

/// Argon2id [`PasswordHasher`].
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(cost: PasswordCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(PasswordError::Params)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::Hashing)?;
        Ok(hash.to_string())
    }

    fn verify(&self, candidate: &str, stored: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(stored).map_err(PasswordError::Corrupt)?;
        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Corrupt(e)),
        }
    }
}
