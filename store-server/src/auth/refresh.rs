//! Refresh token rotation
//!
//! Issues, validates and rotates the long-lived half of the credential
//! pair. Every refresh secret is single-use: rotation revokes the presented
//! record with a conditional write and inserts a linked successor, so a
//! replayed secret, like the loser of a concurrent rotation race, always
//! fails closed with `InvalidToken`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::db::models::{RefreshToken, UserRole};
use crate::db::repository::RefreshTokenRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Byte length of the opaque refresh secret before hex encoding
const SECRET_LEN: usize = 48;

/// Access + refresh credential pair returned to the caller
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh-token service (the credential side of session management)
#[derive(Clone)]
pub struct RefreshTokenService {
    repo: RefreshTokenRepository,
    jwt: Arc<JwtService>,
    refresh_token_days: i64,
}

impl RefreshTokenService {
    pub fn new(db: Surreal<Db>, jwt: Arc<JwtService>, refresh_token_days: i64) -> Self {
        Self {
            repo: RefreshTokenRepository::new(db),
            jwt,
            refresh_token_days,
        }
    }

    /// sha-256 hex digest of a refresh secret; the only form that is stored
    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn generate_secret() -> AppResult<String> {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; SECRET_LEN];
        rng.fill(&mut bytes)
            .map_err(|_| AppError::internal("Failed to generate refresh secret"))?;
        Ok(hex::encode(bytes))
    }

    /// Issue a fresh credential pair for a user
    ///
    /// Starts a new chain; existing chains for the user are untouched, so
    /// parallel sessions on other devices keep working.
    pub async fn issue(&self, user_id: &str, role: UserRole) -> AppResult<IssuedTokens> {
        let access_token = self
            .jwt
            .generate_token(user_id, role)
            .map_err(|e| AppError::internal(format!("Failed to sign access token: {e}")))?;

        let refresh_token = Self::generate_secret()?;
        let now = Utc::now();
        self.repo
            .create(RefreshToken {
                id: None,
                user_id: user_id.to_string(),
                token_hash: Self::hash_secret(&refresh_token),
                expires_at: now + Duration::days(self.refresh_token_days),
                revoked_at: None,
                replaced_by_hash: None,
                created_at: now,
            })
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Rotate a presented refresh secret
    ///
    /// Returns the owning user id and the replacement secret. The presented
    /// secret becomes unusable: the record is revoked before the successor
    /// is inserted, and the revocation is conditional on the record still
    /// being active.
    pub async fn rotate(&self, presented_secret: &str) -> AppResult<(String, String)> {
        let token_hash = Self::hash_secret(presented_secret);
        let now = Utc::now();

        let record = self
            .repo
            .find_by_hash(&token_hash)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or(AppError::InvalidRefreshToken)?;

        if !record.is_usable(now) {
            security_log!(
                "WARN",
                "refresh_token_reuse",
                user_id = record.user_id.clone(),
                revoked = record.revoked_at.is_some()
            );
            return Err(AppError::InvalidRefreshToken);
        }

        let new_secret = Self::generate_secret()?;
        let new_hash = Self::hash_secret(&new_secret);

        // Only the first of two concurrent rotations can flip active →
        // revoked; the loser sees no matched record and fails closed.
        let won = self
            .repo
            .revoke_and_link(&token_hash, &new_hash, now)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !won {
            security_log!(
                "WARN",
                "refresh_token_reuse",
                user_id = record.user_id.clone(),
                revoked = true
            );
            return Err(AppError::InvalidRefreshToken);
        }

        self.repo
            .create(RefreshToken {
                id: None,
                user_id: record.user_id.clone(),
                token_hash: new_hash,
                expires_at: now + Duration::days(self.refresh_token_days),
                revoked_at: None,
                replaced_by_hash: None,
                created_at: now,
            })
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((record.user_id, new_secret))
    }

    /// Sign a new access token for an already-authenticated user
    pub fn sign_access_token(&self, user_id: &str, role: UserRole) -> AppResult<String> {
        self.jwt
            .generate_token(user_id, role)
            .map_err(|e| AppError::internal(format!("Failed to sign access token: {e}")))
    }

    /// Revoke a presented secret; idempotent
    ///
    /// Unknown and already-revoked secrets are a silent no-op so logout
    /// never leaks whether a chain exists.
    pub async fn revoke(&self, presented_secret: &str) -> AppResult<()> {
        let token_hash = Self::hash_secret(presented_secret);
        self.repo
            .revoke_if_active(&token_hash, Utc::now())
            .await
            .map_err(|e| AppError::database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_hash_is_stable_and_one_way() {
        let h1 = RefreshTokenService::hash_secret("secret-a");
        let h2 = RefreshTokenService::hash_secret("secret-a");
        let h3 = RefreshTokenService::hash_secret("secret-b");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        // hex-encoded sha-256
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, "secret-a");
    }

    #[test]
    fn generated_secrets_are_unique_and_high_entropy() {
        let a = RefreshTokenService::generate_secret().unwrap();
        let b = RefreshTokenService::generate_secret().unwrap();
        assert_eq!(a.len(), SECRET_LEN * 2);
        assert_ne!(a, b);
    }
}
