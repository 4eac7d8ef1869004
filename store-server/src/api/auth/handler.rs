//! Authentication Handlers
//!
//! Registration, login, refresh rotation, logout and password reset.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::{Value, json};
use validator::Validate;

use shared::dto::auth::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, ResetPasswordRequest,
};

use crate::auth::{CurrentUser, RefreshTokenService};
use crate::core::ServerState;
use crate::db::models::{User, UserRole};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Reset token lifetime
const RESET_TOKEN_MINUTES: i64 = 60;

fn random_reset_token() -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate reset token"))?;
    Ok(hex::encode(bytes))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let users = UserRepository::new(state.db.clone());
    let email = req.email.trim().to_lowercase();

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let now = Utc::now();
    let preferences = shared::dto::auth::UserPreferences {
        newsletter: req.newsletter.unwrap_or(false),
        ..Default::default()
    };

    let user = users
        .create(User {
            id: None,
            email,
            password_hash,
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            phone: req.phone,
            role: UserRole::Customer,
            is_email_verified: false,
            preferences,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    let tokens = state
        .refresh_tokens
        .issue(&user.id_string(), user.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.to_public(),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    req.validate()?;

    let users = UserRepository::new(state.db.clone());
    let user = users.find_by_email(&req.email).await?;

    // Fixed delay before inspecting the result, against timing probes
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error for both missing user and bad password, against
    // account enumeration
    let user = match user {
        Some(user) => {
            let password_valid = user
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            user
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let tokens = state
        .refresh_tokens
        .issue(&user.id_string(), user.role)
        .await?;

    Ok(Json(AuthResponse {
        user: user.to_public(),
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/refresh
///
/// Rotates the presented refresh secret; the old secret becomes unusable.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    req.validate()?;

    let (user_id, new_refresh_token) = state.refresh_tokens.rotate(&req.refresh_token).await?;

    // The chain outlived its user only if the account was deleted
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&user_id)
        .await?
        .ok_or(AppError::InvalidRefreshToken)?;

    let token = state
        .refresh_tokens
        .sign_access_token(&user.id_string(), user.role)?;

    Ok(Json(RefreshResponse {
        token,
        refresh_token: new_refresh_token,
    }))
}

/// POST /api/auth/logout
///
/// Always succeeds; revocation of unknown tokens is a silent no-op.
pub async fn logout(
    State(state): State<ServerState>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;
    state.refresh_tokens.revoke(&req.refresh_token).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Value>> {
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    Ok(Json(json!({ "user": user.to_public() })))
}

/// POST /api/auth/forgot-password
///
/// Always responds success so callers cannot probe which emails exist.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;

    let users = UserRepository::new(state.db.clone());
    if let Some(user) = users.find_by_email(&req.email).await? {
        let token = random_reset_token()?;
        users
            .set_reset_token(
                &user.id_string(),
                RefreshTokenService::hash_secret(&token),
                Utc::now() + chrono::Duration::minutes(RESET_TOKEN_MINUTES),
            )
            .await?;

        if let Err(e) = state.mailer.send_password_reset(&user.email, &token).await {
            tracing::warn!(email = %user.email, error = %e, "Reset mail failed");
        }
    }

    Ok(Json(json!({ "success": true })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;

    let users = UserRepository::new(state.db.clone());
    let token_hash = RefreshTokenService::hash_secret(&req.token);

    let user = users
        .find_by_reset_hash(&token_hash)
        .await?
        .filter(|u| {
            u.password_reset_expires_at
                .is_some_and(|expires| expires > Utc::now())
        })
        .ok_or_else(|| AppError::invalid("Invalid or expired reset token"))?;

    let password_hash = User::hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    users.set_password(&user.id_string(), password_hash).await?;

    Ok(Json(json!({ "success": true })))
}
