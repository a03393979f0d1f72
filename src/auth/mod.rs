use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;

use crate::{
    domain::User,
    error::Result,
};

pub mod password;
pub mod session;

use session::{Session, SessionStore};

pub use password::{hash_password, verify_password};
pub use session::{snapshot_user, SessionSnapshot, SnapshotLevel};

pub const SESSION_COOKIE: &str = "session";

pub struct AuthService {
    session_store: SessionStore,
    session_duration_hours: i64,
    snapshot_limit: usize,
}

impl AuthService {
    pub fn new(pool: SqlitePool, session_duration_hours: i64, snapshot_limit: usize) -> Self {
        Self {
            session_store: SessionStore::new(pool),
            session_duration_hours,
            snapshot_limit,
        }
    }

    /// Opens a session for a user who just logged in. The stored snapshot
    /// goes through the size ladder, so an oversized record can still log
    /// in with a reduced snapshot.
    pub async fn create_session(&self, user: &User) -> Result<(Session, String)> {
        let snapshot = snapshot_user(user, self.snapshot_limit)?;
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);

        let session = self.session_store
            .create(&user.id, &token, &snapshot.json, expires_at)
            .await?;

        Ok((session, token))
    }

    pub async fn validate_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_store.find_by_token(token).await
    }

    pub async fn invalidate_session(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
