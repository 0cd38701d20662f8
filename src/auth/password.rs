//! Argon2id password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid work factor: {0}")]
    InvalidWorkFactor(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id hasher with a fixed, process-wide time cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(work_factor: u32) -> Result<Self, PasswordError> {
        let params = Params::new(Params::DEFAULT_M_COST, work_factor, Params::DEFAULT_P_COST, None)
            .map_err(|e| PasswordError::InvalidWorkFactor(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes with a fresh random salt; returns a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Malformed digests verify as `false`.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        // Parameters are read from the digest itself, so older work factors still verify.
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = hasher();
        let digest = hasher.hash("password1").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("password1", &digest));
        assert!(!hasher.verify("wrong", &digest));
    }

    #[test]
    fn hashing_is_salted() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn digest_from_other_work_factor_still_verifies() {
        let digest = PasswordHasher::new(2).unwrap().hash("pw").unwrap();
        assert!(hasher().verify("pw", &digest));
    }

    #[test]
    fn malformed_digest_is_false() {
        let hasher = hasher();
        assert!(!hasher.verify("password1", ""));
        assert!(!hasher.verify("password1", "$2b$12$notargon"));
        assert!(!hasher.verify("password1", "plaintext"));
    }

    #[test]
    fn zero_work_factor_is_rejected() {
        assert!(matches!(PasswordHasher::new(0), Err(PasswordError::InvalidWorkFactor(_))));
    }
}
