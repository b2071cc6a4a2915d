use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

/// Hashes and verifies user passwords with Argon2id.
///
/// Only the PHC-format hash is ever stored; the plaintext password exists
/// just long enough to hash or verify it.
pub struct PasswordManager {
    argon2: Argon2<'static>,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Config(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Config(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Config(format!("failed to verify password: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_format() {
        let manager = PasswordManager::new();
        let hash = manager.hash("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_correct_password() {
        let manager = PasswordManager::new();
        let hash = manager.hash("hunter2").unwrap();

        assert!(manager.verify("hunter2", &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let manager = PasswordManager::new();
        let hash = manager.hash("hunter2").unwrap();

        assert!(!manager.verify("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_verify_garbage_hash() {
        let manager = PasswordManager::new();
        assert!(manager.verify("hunter2", "not-a-hash").is_err());
    }
}
