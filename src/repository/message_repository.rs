use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::Message,
    error::{AppError, Result},
    repository::MessageRepository,
};

#[derive(FromRow)]
struct MessageRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    content: String,
    timestamp: NaiveDateTime,
    is_read: i32,
}

pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: MessageRow) -> Message {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            content: row.content,
            timestamp: DateTime::from_naive_utc_and_offset(row.timestamp, Utc),
            is_read: row.is_read != 0,
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, timestamp, is_read
            FROM messages
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Self::row_to_message))
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, message: &Message) -> Result<Message> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, content, timestamp, is_read)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.content)
        .bind(message.timestamp.naive_utc())
        .bind(if message.is_read { 1i32 } else { 0i32 })
        .execute(&self.pool)
        .await?;

        self.find_by_id(&message.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created message".to_string())
        })
    }

    async fn list_between(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>> {
        // Equal timestamps keep their insertion order.
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, timestamp, is_read
            FROM messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY timestamp ASC, rowid ASC
            "#
        )
        .bind(user_id)
        .bind(other_id)
        .bind(other_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Self::row_to_message).collect())
    }

    async fn counterpart_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT CASE WHEN sender_id = ? THEN receiver_id ELSE sender_id END AS counterpart
            FROM messages
            WHERE sender_id = ? OR receiver_id = ?
            GROUP BY counterpart
            HAVING counterpart != ?
            ORDER BY MAX(timestamp) DESC
            "#
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn mark_read(&self, receiver_id: &str, sender_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE receiver_id = ? AND sender_id = ? AND is_read = 0"
        )
        .bind(receiver_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unread_count(&self, receiver_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = ? AND is_read = 0"
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
