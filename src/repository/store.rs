use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{
    config::DatabaseConfig,
    error::Result,
    repository::defaults,
};

/// The four collections the portal persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Payments,
    Messages,
    Announcements,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Payments,
        Collection::Messages,
        Collection::Announcements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Payments => "payments",
            Collection::Messages => "messages",
            Collection::Announcements => "announcements",
        }
    }
}

/// Owns the connection pool and the schema. Repositories borrow the pool.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private database that lives as long as the store. A single
    /// connection that never idles out keeps the data alive.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Seeds every collection that has never been initialised (or whose
    /// marker was removed) with the built-in defaults. Returns the
    /// collections that were seeded.
    pub async fn load_or_seed(&self, today: NaiveDate) -> Result<Vec<Collection>> {
        let mut seeded = Vec::new();

        for collection in Collection::ALL {
            let marker = sqlx::query_scalar::<_, String>(
                "SELECT name FROM collection_markers WHERE name = ?"
            )
            .bind(collection.as_str())
            .fetch_optional(&self.pool)
            .await?;

            if marker.is_some() {
                continue;
            }

            self.seed(collection, today).await?;
            seeded.push(collection);
        }

        Ok(seeded)
    }

    async fn seed(&self, collection: Collection, today: NaiveDate) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // An absent marker resets the collection to factory defaults.
        sqlx::query(&format!("DELETE FROM {}", collection.as_str()))
            .execute(&mut *tx)
            .await?;

        let count = match collection {
            Collection::Users => {
                let users = defaults::users(today)?;
                for (user, password_hash) in &users {
                    super::user_repository::insert_user(&mut *tx, user, password_hash).await?;
                }
                users.len()
            }
            Collection::Payments => {
                let payments = defaults::payments(today);
                for payment in &payments {
                    super::payment_repository::insert_payment(&mut *tx, payment).await?;
                }
                payments.len()
            }
            Collection::Announcements => {
                let announcements = defaults::announcements(today);
                for announcement in &announcements {
                    super::announcement_repository::insert_announcement(&mut *tx, announcement)
                        .await?;
                }
                announcements.len()
            }
            Collection::Messages => 0,
        };

        sqlx::query("INSERT INTO collection_markers (name, seeded_at) VALUES (?, ?)")
            .bind(collection.as_str())
            .bind(Utc::now().naive_utc())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Seeded {} with {} default records", collection.as_str(), count);
        Ok(())
    }
}

