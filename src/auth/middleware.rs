use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::{self, Claims};
use crate::catalog::Audience;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header.".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format.".to_string())
        })?;

        let claims = jwt::validate_access_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;

        Ok(Self(claims))
    }
}

/// Requires the caller to hold the `ADMIN` or `SUPER_ADMIN` role.
///
/// ```ignore
/// async fn handler(StaffUser(claims): StaffUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct StaffUser(pub Claims);

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_staff() {
            return Err(AppError::Forbidden("Admin role required.".to_string()));
        }

        Ok(Self(claims))
    }
}

/// Optional identity: a missing or invalid token reads as the public audience.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Audience);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(claims)) if claims.is_staff() => Ok(Self(Audience::Staff)),
            _ => Ok(Self(Audience::Public)),
        }
    }
}
