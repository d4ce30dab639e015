use std::fmt;

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("argon2 hash_password error: {0}")]
    Hashing(String),
    #[error("argon2 verify error: {0}")]
    Verify(String),
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
}

/// Argon2id at a fixed work factor, shared by every request.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(cfg: &PasswordConfig) -> Result<Self, CredentialError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                CredentialError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }
}

/// A user's stored credential.
///
/// `hash` is the PHC string written to storage. `plaintext` only lives between
/// [`Password::set`] and [`Password::clear_plaintext`] so the validation pass
/// of the same request can check its length.
#[derive(Clone, Default)]
pub struct Password {
    plaintext: Option<String>,
    hash: Option<String>,
}

impl Password {
    pub fn from_hash(hash: String) -> Self {
        Self {
            plaintext: None,
            hash: Some(hash),
        }
    }

    pub fn set(&mut self, plaintext: &str, hasher: &PasswordHasher) -> Result<(), CredentialError> {
        let hash = hasher.hash(plaintext)?;
        self.plaintext = Some(plaintext.to_owned());
        self.hash = Some(hash);
        Ok(())
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash
    /// cannot be checked at all.
    pub fn matches(&self, candidate: &str) -> Result<bool, CredentialError> {
        let Some(hash) = self.hash.as_deref() else {
            return Err(CredentialError::Verify("no password hash set".into()));
        };
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            CredentialError::Verify(e.to_string())
        })?;
        // The PHC string carries its own params, so the default instance verifies any cost.
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Verify(e.to_string())),
        }
    }

    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn clear_plaintext(&mut self) {
        self.plaintext = None;
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("plaintext", &self.plaintext.as_ref().map(|_| "[redacted]"))
            .field("hash", &self.hash.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap argon2 params are valid")
}
