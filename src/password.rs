//! Password hashing and verification
//!
//! Argon2id over a caller-supplied salt. The digest is stored base64
//! encoded (standard alphabet, no padding) and the salt is stored raw
//! next to it on the user record.

use argon2::password_hash::Output;
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

use crate::config::HashConfig;
use crate::error::{AuthError, ConfigError};

/// Smallest salt Argon2 accepts.
pub const MIN_SALT_LEN: usize = 8;

/// Salted Argon2id hasher with a fixed parameter set
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    salt_len: usize,
    key_len: usize,
}

impl PasswordHasher {
    /// Build a hasher, validating the parameters up front
    pub fn new(config: &HashConfig) -> Result<Self, ConfigError> {
        if config.salt_len < MIN_SALT_LEN {
            return Err(ConfigError::SaltTooShort { min: MIN_SALT_LEN });
        }
        let params = Params::new(
            config.memory_kib,
            config.time_cost,
            config.lanes,
            Some(config.key_len),
        )
        .map_err(|e| ConfigError::InvalidHashParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            salt_len: config.salt_len,
            key_len: config.key_len,
        })
    }

    /// Generate a fresh random salt of the configured length
    pub fn generate_salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; self.salt_len];
        rand::thread_rng().fill_bytes(&mut salt);
        salt
    }

    /// Hash a password with the given salt
    pub fn hash(&self, password: &str, salt: &[u8]) -> Result<String, AuthError> {
        Ok(STANDARD_NO_PAD.encode(self.digest(password, salt)?))
    }

    /// Check a password against a stored salt and digest
    ///
    /// The digests are compared as `Output` values, whose equality check
    /// runs in constant time. A digest that is not valid base64, or not a
    /// legal Argon2 output length, never matches.
    pub fn verify(&self, password: &str, salt: &[u8], digest: &str) -> bool {
        let Ok(stored) = STANDARD_NO_PAD.decode(digest) else {
            return false;
        };
        let Ok(stored) = Output::new(&stored) else {
            return false;
        };
        let Ok(candidate) = self.digest(password, salt) else {
            return false;
        };
        Output::new(&candidate).is_ok_and(|candidate| candidate == stored)
    }

    fn digest(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut digest = vec![0u8; self.key_len];
        self.argon2
            .hash_password_into(password.as_bytes(), salt, &mut digest)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(digest)
    }
}
