use chrono::{DateTime, Utc, NaiveDateTime};
use serde::Serialize;
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{MemberStatus, Role, User, UserDocuments},
    error::{AppError, Result},
};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub snapshot: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    token_hash: String,
    snapshot: String,
    expires_at: NaiveDateTime,
    created_at: NaiveDateTime,
    last_used_at: NaiveDateTime,
}

/// How much of the user record survived into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotLevel {
    Full,
    WithoutProfileImage,
    WithoutDocuments,
    Minimal,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub level: SnapshotLevel,
    pub json: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MinimalSessionUser<'a> {
    id: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    role: Role,
    status: MemberStatus,
    business_name: &'a str,
}

/// Serializes `user` for session storage, dropping the profile image and
/// then the documents until the record fits in `limit` bytes. The last
/// resort is a minimal identity subset.
pub fn snapshot_user(user: &User, limit: usize) -> Result<SessionSnapshot> {
    let full = serde_json::to_string(user)?;
    if full.len() <= limit {
        return Ok(SessionSnapshot { level: SnapshotLevel::Full, json: full });
    }

    let mut trimmed = user.clone();
    trimmed.profile_image = None;
    let json = serde_json::to_string(&trimmed)?;
    if json.len() <= limit {
        tracing::warn!(user_id = %user.id, "Session snapshot dropped profile image");
        return Ok(SessionSnapshot { level: SnapshotLevel::WithoutProfileImage, json });
    }

    trimmed.documents = UserDocuments::default();
    let json = serde_json::to_string(&trimmed)?;
    if json.len() <= limit {
        tracing::warn!(user_id = %user.id, "Session snapshot dropped documents");
        return Ok(SessionSnapshot { level: SnapshotLevel::WithoutDocuments, json });
    }

    let minimal = MinimalSessionUser {
        id: &user.id,
        first_name: &user.first_name,
        last_name: &user.last_name,
        email: &user.email,
        role: user.role,
        status: user.status,
        business_name: &user.business_name,
    };
    let json = serde_json::to_string(&minimal)?;
    if json.len() <= limit {
        tracing::warn!(user_id = %user.id, "Session snapshot reduced to minimal record");
        return Ok(SessionSnapshot { level: SnapshotLevel::Minimal, json });
    }

    Err(AppError::StorageExhausted)
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        token: &str,
        snapshot: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let id = Uuid::new_v4().to_string();
        let token_hash = hash_token(token);
        let now = Utc::now();

        let expires_at_naive = expires_at.naive_utc();
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, snapshot, expires_at, created_at, last_used_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id)
        .bind(user_id)
        .bind(&token_hash)
        .bind(snapshot)
        .bind(expires_at_naive)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id,
            user_id: user_id.to_string(),
            token_hash,
            snapshot: snapshot.to_string(),
            expires_at,
            created_at: now,
            last_used_at: now,
        })
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let token_hash = hash_token(token);
        let now_naive = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, token_hash, snapshot, expires_at, created_at, last_used_at
            FROM sessions
            WHERE token_hash = ? AND expires_at > ?
            "#
        )
        .bind(&token_hash)
        .bind(now_naive)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
            .bind(now_naive)
            .bind(&row.id)
            .execute(&self.pool)
            .await?;

        Ok(Some(Session {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            snapshot: row.snapshot,
            expires_at: DateTime::from_naive_utc_and_offset(row.expires_at, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            last_used_at: DateTime::from_naive_utc_and_offset(now_naive, Utc),
        }))
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        let token_hash = hash_token(token);

        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        let now_naive = Utc::now().naive_utc();
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now_naive)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn hash_token(token: &str) -> String {
    use sha2::{Sha256, Digest};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
