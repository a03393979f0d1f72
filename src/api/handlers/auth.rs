use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{AuthService, SESSION_COOKIE},
    domain::{RegisterRequest, User},
    error::Result,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<User>)> {
    let user = state.service_context.member_service
        .login(&req.email, &req.password)
        .await?;

    // Create session (returns both session and token)
    let (_session, token) = state.service_context.auth_service
        .create_session(&user)
        .await?;

    let cookie = state.service_context.auth_service
        .create_session_cookie(&token, state.settings.auth.secure_cookies);

    Ok((jar.add(cookie), Json(user)))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.service_context.member_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        // Invalidate session in database
        let _ = state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    // Remove cookie
    let jar = jar.add(AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// The record stored with the session, possibly reduced to fit.
pub async fn session(
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>> {
    let snapshot = serde_json::from_str(&current.session.snapshot)?;
    Ok(Json(snapshot))
}
