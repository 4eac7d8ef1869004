//! Auth middleware
//!
//! Role gate for admin routes, applied with `route_layer` so the 401/403
//! decision happens before the handler body runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Require a staff role (admin or moderator)
///
/// Validates the bearer token, checks the role and injects [`CurrentUser`]
/// into request extensions for the downstream extractor.
pub async fn require_staff(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        AppError::invalid_token("Invalid or expired token")
    })?;

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;

    if !user.role.is_staff() {
        security_log!(
            "WARN",
            "role_denied",
            user_id = user.user_id.clone(),
            role = user.role.as_str(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::forbidden("Staff role required"));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
