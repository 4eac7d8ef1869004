//! User Repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, is_unique_violation, make_record_id};
use crate::db::models::User;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

/// Patch issued by the forgot-password flow
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetTokenPatch {
    password_reset_token_hash: String,
    password_reset_expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Patch issued by the reset-password flow; explicit nulls clear the
/// outstanding reset token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordPatch {
    password_hash: String,
    password_reset_token_hash: Option<String>,
    password_reset_expires_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = make_record_id(USER_TABLE, id);
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let user: Option<User> = result.take(0)?;
        Ok(user)
    }

    /// Create a user; the unique index on email backs the caller's
    /// read-check with a hard constraint
    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self
            .base
            .db()
            .create(USER_TABLE)
            .content(user)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoError::Duplicate("Email already registered".to_string())
                } else {
                    e.into()
                }
            })?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Stamp a password-reset token hash and expiry on the user
    pub async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let rid = make_record_id(USER_TABLE, user_id);
        let _: Option<User> = self
            .base
            .db()
            .update(rid)
            .merge(ResetTokenPatch {
                password_reset_token_hash: token_hash,
                password_reset_expires_at: expires_at,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(())
    }

    pub async fn find_by_reset_hash(&self, token_hash: &str) -> RepoResult<Option<User>> {
        let hash = token_hash.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE passwordResetTokenHash = $hash LIMIT 1")
            .bind(("hash", hash))
            .await?;
        let user: Option<User> = result.take(0)?;
        Ok(user)
    }

    /// Replace the password hash and clear any outstanding reset token
    pub async fn set_password(&self, user_id: &str, password_hash: String) -> RepoResult<()> {
        let rid = make_record_id(USER_TABLE, user_id);
        let _: Option<User> = self
            .base
            .db()
            .update(rid)
            .merge(PasswordPatch {
                password_hash,
                password_reset_token_hash: None,
                password_reset_expires_at: None,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(())
    }
}
