use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{SqlitePool, SqliteExecutor, FromRow};

use crate::{
    domain::Announcement,
    error::{AppError, Result},
    repository::AnnouncementRepository,
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    date: NaiveDate,
    is_important: i32,
}

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Announcement {
        Announcement {
            id: row.id,
            title: row.title,
            content: row.content,
            date: row.date,
            is_important: row.is_important != 0,
        }
    }
}

pub(crate) async fn insert_announcement<'e, E>(executor: E, announcement: &Announcement) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO announcements (id, title, content, date, is_important, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(&announcement.id)
    .bind(&announcement.title)
    .bind(&announcement.content)
    .bind(announcement.date)
    .bind(if announcement.is_important { 1i32 } else { 0i32 })
    .bind(Utc::now().naive_utc())
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: &Announcement) -> Result<Announcement> {
        insert_announcement(&self.pool, announcement).await?;

        let row = sqlx::query_as::<_, AnnouncementRow>(
            "SELECT id, title, content, date, is_important FROM announcements WHERE id = ?"
        )
        .bind(&announcement.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_announcement).ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn list(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, title, content, date, is_important
            FROM announcements
            ORDER BY rowid DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Self::row_to_announcement).collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
