//! Refresh Token Model
//!
//! One link in a per-user refresh chain. Only the sha-256 hash of the
//! secret is stored; the secret itself never touches the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Refresh token record
///
/// State machine: active → revoked (terminal, stored) or active → expired
/// (terminal, time-based, never stored). A revoked token can never become
/// active again; rotation always inserts a fresh record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Owning user, "user:key" string
    pub user_id: String,
    /// sha-256 of the opaque secret, hex encoded
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    /// Absent (NONE) while active; the repository's conditional writes
    /// match on that absence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    /// Hash of the token that replaced this one (rotation chain pointer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Usable iff unexpired and unrevoked; expiry is enforced lazily here,
    /// never by a background sweep
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration, revoked: bool) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: None,
            user_id: "user:u1".into(),
            token_hash: "h".into(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            replaced_by_hash: None,
            created_at: now,
        }
    }

    #[test]
    fn usable_only_when_unexpired_and_unrevoked() {
        let now = Utc::now();
        assert!(token(Duration::hours(1), false).is_usable(now));
        assert!(!token(Duration::hours(1), true).is_usable(now));
        assert!(!token(Duration::hours(-1), false).is_usable(now));
        assert!(!token(Duration::hours(-1), true).is_usable(now));
    }
}
