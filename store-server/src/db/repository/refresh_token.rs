//! Refresh Token Repository
//!
//! Rotation safety lives here: `revoke_and_link` is a conditional
//! single-record write on `revokedAt IS NONE`, so of two concurrent
//! rotations of the same secret only the first can flip active → revoked;
//! the second observes no matched record and fails closed.

use chrono::{DateTime, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::RefreshToken;

#[derive(Clone)]
pub struct RefreshTokenRepository {
    base: BaseRepository,
}

impl RefreshTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, token: RefreshToken) -> RepoResult<RefreshToken> {
        let created: Option<RefreshToken> = self
            .base
            .db()
            .create("refresh_token")
            .content(token)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to store refresh token".to_string()))
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        let hash = token_hash.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM refresh_token WHERE tokenHash = $hash LIMIT 1")
            .bind(("hash", hash))
            .await?;
        let token: Option<RefreshToken> = result.take(0)?;
        Ok(token)
    }

    /// Conditionally revoke a still-active token and point it at its
    /// replacement. Returns false if the record was already revoked or does
    /// not exist; the caller must treat that as token reuse.
    pub async fn revoke_and_link(
        &self,
        token_hash: &str,
        replaced_by_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE refresh_token SET revokedAt = $now, replacedByHash = $next \
                 WHERE tokenHash = $hash AND revokedAt IS NONE RETURN AFTER",
            )
            .bind(("hash", token_hash.to_string()))
            .bind(("next", replaced_by_hash.to_string()))
            .bind(("now", now))
            .await?;
        let revoked: Vec<RefreshToken> = result.take(0)?;
        Ok(!revoked.is_empty())
    }

    /// Revoke the matching active token; a no-op for unknown or
    /// already-revoked hashes so callers cannot probe chain state
    pub async fn revoke_if_active(&self, token_hash: &str, now: DateTime<Utc>) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE refresh_token SET revokedAt = $now \
                 WHERE tokenHash = $hash AND revokedAt IS NONE",
            )
            .bind(("hash", token_hash.to_string()))
            .bind(("now", now))
            .await?;
        Ok(())
    }
}
