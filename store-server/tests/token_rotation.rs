//! Refresh-token rotation integration tests
//!
//! Full stack against an embedded database: issue, rotate, replay, expiry
//! and the concurrent-rotation race.

use chrono::{Duration, Utc};
use store_server::db::models::{RefreshToken, User, UserRole};
use store_server::db::repository::RefreshTokenRepository;
use store_server::{AppError, Config, RefreshTokenService, ServerState};

async fn test_state() -> (ServerState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await;
    (state, tmp)
}

async fn seed_user(state: &ServerState) -> String {
    let now = Utc::now();
    let users = store_server::db::repository::UserRepository::new(state.db.clone());
    let user = users
        .create(User {
            id: None,
            email: "customer@example.com".to_string(),
            password_hash: User::hash_password("hunter2hunter2").unwrap(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            phone: None,
            role: UserRole::Customer,
            is_email_verified: false,
            preferences: Default::default(),
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    user.id_string()
}

#[tokio::test]
async fn rotated_secret_is_single_use() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    let issued = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();

    // First rotation succeeds and yields a different secret
    let (rotated_user, new_secret) = state
        .refresh_tokens
        .rotate(&issued.refresh_token)
        .await
        .unwrap();
    assert_eq!(rotated_user, user_id);
    assert_ne!(new_secret, issued.refresh_token);

    // Replaying the retired secret fails closed
    let err = state
        .refresh_tokens
        .rotate(&issued.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRefreshToken));

    // The replacement is live
    state.refresh_tokens.rotate(&new_secret).await.unwrap();
}

#[tokio::test]
async fn rotation_links_the_chain() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    let issued = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();
    let (_, new_secret) = state
        .refresh_tokens
        .rotate(&issued.refresh_token)
        .await
        .unwrap();

    let repo = RefreshTokenRepository::new(state.db.clone());
    let old_record = repo
        .find_by_hash(&RefreshTokenService::hash_secret(&issued.refresh_token))
        .await
        .unwrap()
        .unwrap();

    assert!(old_record.revoked_at.is_some());
    assert_eq!(
        old_record.replaced_by_hash.as_deref(),
        Some(RefreshTokenService::hash_secret(&new_secret).as_str())
    );
}

#[tokio::test]
async fn expired_secret_fails_rotation_without_explicit_revocation() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    let secret = "an-expired-but-never-revoked-secret";
    let repo = RefreshTokenRepository::new(state.db.clone());
    repo.create(RefreshToken {
        id: None,
        user_id: user_id.clone(),
        token_hash: RefreshTokenService::hash_secret(secret),
        expires_at: Utc::now() - Duration::hours(1),
        revoked_at: None,
        replaced_by_hash: None,
        created_at: Utc::now() - Duration::days(31),
    })
    .await
    .unwrap();

    let err = state.refresh_tokens.rotate(secret).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidRefreshToken));
}

#[tokio::test]
async fn revoke_is_idempotent_and_terminal() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    // Revoking an unknown secret is a silent no-op
    state.refresh_tokens.revoke("never-issued").await.unwrap();

    let issued = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();

    state
        .refresh_tokens
        .revoke(&issued.refresh_token)
        .await
        .unwrap();
    // Second revocation is still fine
    state
        .refresh_tokens
        .revoke(&issued.refresh_token)
        .await
        .unwrap();

    // A revoked token can never become active again
    let err = state
        .refresh_tokens
        .rotate(&issued.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRefreshToken));
}

#[tokio::test]
async fn issuing_does_not_disturb_existing_chains() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    let first = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();
    let second = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();

    // Both sessions stay usable independently
    state.refresh_tokens.rotate(&first.refresh_token).await.unwrap();
    state.refresh_tokens.rotate(&second.refresh_token).await.unwrap();
}

#[tokio::test]
async fn concurrent_rotation_has_exactly_one_winner() {
    let (state, _tmp) = test_state().await;
    let user_id = seed_user(&state).await;

    let issued = state
        .refresh_tokens
        .issue(&user_id, UserRole::Customer)
        .await
        .unwrap();

    let secret = issued.refresh_token;
    let s1 = state.clone();
    let s2 = state.clone();
    let secret1 = secret.clone();
    let secret2 = secret.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { s1.refresh_tokens.rotate(&secret1).await }),
        tokio::spawn(async move { s2.refresh_tokens.rotate(&secret2).await }),
    );

    let results = [a.unwrap(), b.unwrap()];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent rotation must win");

    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        AppError::InvalidRefreshToken
    ));
}
