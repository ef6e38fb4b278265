use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::services::accounts::{self, LoginRequest, SignupRequest};
use crate::state::AppState;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppError;

#[derive(Serialize)]
struct LoginPayload {
    name: String,
    #[serde(rename = "isOrganizer")]
    is_organizer: bool,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Response, AppError> {
    let profile = accounts::signup(state.store.as_ref(), body).await?;
    Ok(created(profile, "Account created"))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let (user, token) = accounts::login(state.store.as_ref(), &state.sessions, body).await?;

    let jar = jar.add(session_cookie(token, state.config.production));
    let payload = LoginPayload {
        name: user.name,
        is_organizer: user.role.is_organizer(),
    };
    Ok((jar, success(payload, "Logged in")).into_response())
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, empty_success("Logged out")).into_response()
}

pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Response, AppError> {
    let profile = accounts::profile(state.store.as_ref(), user.user_id).await?;
    Ok(success(profile, "Current user"))
}
