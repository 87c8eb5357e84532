//! Password hashing and verification.

use crate::error::{CatalogError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;

/// Opaque password hashing service.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Produce a self-describing hash of the password.
    async fn hash_password(&self, password: &str) -> Result<String>;

    /// Check a password against a stored hash. A malformed hash never matches.
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id with default parameters. Work runs on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct Argon2Credentials;

impl Argon2Credentials {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous hash, used by the command line helper.
    pub fn hash_blocking(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CatalogError::Unexpected(format!("password hashing failed: {}", e)))
    }

    fn verify_blocking(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl CredentialVerifier for Argon2Credentials {
    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Self::hash_blocking(&password))
            .await
            .map_err(|e| CatalogError::Unexpected(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || Self::verify_blocking(&password, &hash))
            .await
            .map_err(|e| CatalogError::Unexpected(format!("verification task failed: {}", e)))
    }
}
