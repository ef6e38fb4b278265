//! Role dispatch happens here, once, at the request boundary. Handlers take
//! `AuthUser` or `OrganizerUser` and never inspect roles themselves.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use super::session::{Claims, SESSION_COOKIE};
use crate::models::Role;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Cookie first, then `Authorization: Bearer` for non-browser clients.
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)
            .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;
        let claims = state.sessions.validate(&token)?;
        Ok(claims.into())
    }
}

/// An authenticated user holding the organizer role.
#[derive(Debug, Clone)]
pub struct OrganizerUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for OrganizerUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_organizer() {
            return Err(AppError::Forbidden(
                "Only organizers can perform this action".to_string(),
            ));
        }
        Ok(OrganizerUser(user))
    }
}
