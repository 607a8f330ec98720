use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;

/// Session key the logged-in identity is stored under.
pub const SESSION_USER_KEY: &str = "current_user";

/// Identity written to the server-side session at login and recovered on
/// every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // The session is placed in request extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()))?;

        session
            .get::<AuthUser>(SESSION_USER_KEY)
            .await
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".into()))
    }
}

/// Like [`AuthUser`], but anonymous requests pass through with `None`.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AuthUser>(SESSION_USER_KEY)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}
