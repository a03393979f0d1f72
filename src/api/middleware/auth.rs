use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::{session::Session, SESSION_COOKIE},
    domain::{MemberStatus, User},
    error::{AppError, Result},
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Members reach only their own records; administrators reach all.
    pub fn ensure_self_or_admin(&self, user_id: &str) -> Result<()> {
        if self.is_admin() || self.user.id == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn ensure_self(&self, user_id: &str) -> Result<()> {
        if self.user.id == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Resolves the session cookie to the evaluated user record. A session
/// outlives neither the user's good standing nor the user record.
async fn resolve(state: &AppState, jar: &CookieJar) -> Result<CurrentUser> {
    let session_cookie = jar
        .get(SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let session = state.service_context.auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = match state.service_context.member_service.get_user(&session.user_id).await {
        Ok(user) => user,
        Err(AppError::UserNotFound(_)) => return Err(AppError::Unauthorized),
        Err(e) => return Err(e),
    };

    match user.status {
        MemberStatus::Active => {}
        MemberStatus::Pending => return Err(AppError::AccountPending),
        MemberStatus::Suspended => return Err(AppError::AccountSuspended),
        MemberStatus::Expired => return Err(AppError::AccountExpired),
    }

    Ok(CurrentUser { user, session })
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current = resolve(&state, &jar).await?;

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current = resolve(&state, &jar).await?;

    if !current.is_admin() {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}
