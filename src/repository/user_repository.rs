use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{SqlitePool, SqliteExecutor, FromRow};

use crate::{
    domain::{MemberStatus, Role, User, UserDocuments},
    error::{AppError, Result},
    repository::UserRepository,
};

const USER_COLUMNS: &str = r#"
    id, email, role, status, category, first_name, last_name, phone,
    business_name, business_address, state, materials, machinery,
    monthly_volume, employees, date_joined, expiry_date, profile_image, documents
"#;

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    role: String,
    status: String,
    category: String,
    first_name: String,
    last_name: String,
    phone: String,
    business_name: String,
    business_address: String,
    state: String,
    materials: String,
    machinery: String,
    monthly_volume: f64,
    employees: i64,
    date_joined: NaiveDate,
    expiry_date: NaiveDate,
    profile_image: Option<String>,
    documents: String,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        let documents: UserDocuments = serde_json::from_str(&row.documents)
            .map_err(|e| AppError::Database(format!("Invalid documents for {}: {}", row.id, e)))?;

        Ok(User {
            role: parse_role(&row.role)?,
            status: parse_member_status(&row.status)?,
            id: row.id,
            email: row.email,
            category: row.category,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            business_name: row.business_name,
            business_address: row.business_address,
            state: row.state,
            materials: row.materials,
            machinery: row.machinery,
            monthly_volume: row.monthly_volume,
            employees: row.employees,
            date_joined: row.date_joined,
            expiry_date: row.expiry_date,
            profile_image: row.profile_image,
            documents,
        })
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column)
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }
}

pub(crate) fn parse_role(s: &str) -> Result<Role> {
    match s {
        "ADMIN" => Ok(Role::Admin),
        "MEMBER" => Ok(Role::Member),
        _ => Err(AppError::Database(format!("Invalid role: {}", s))),
    }
}

pub(crate) fn role_to_str(role: &Role) -> &'static str {
    match role {
        Role::Admin => "ADMIN",
        Role::Member => "MEMBER",
    }
}

pub(crate) fn parse_member_status(s: &str) -> Result<MemberStatus> {
    match s {
        "Pending" => Ok(MemberStatus::Pending),
        "Active" => Ok(MemberStatus::Active),
        "Suspended" => Ok(MemberStatus::Suspended),
        "Expired" => Ok(MemberStatus::Expired),
        _ => Err(AppError::Database(format!("Invalid member status: {}", s))),
    }
}

pub(crate) fn member_status_to_str(status: &MemberStatus) -> &'static str {
    match status {
        MemberStatus::Pending => "Pending",
        MemberStatus::Active => "Active",
        MemberStatus::Suspended => "Suspended",
        MemberStatus::Expired => "Expired",
    }
}

/// Maps unique-constraint failures on the users table onto the domain
/// errors callers expect.
fn map_user_write_error(err: sqlx::Error, user: &User) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            if db.message().contains("users.email") {
                return AppError::DuplicateEmail;
            }
            return AppError::IdAlreadyAssigned(user.id.clone());
        }
    }
    AppError::from(err)
}

pub(crate) async fn insert_user<'e, E>(executor: E, user: &User, password_hash: &str) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now().naive_utc();
    let documents = serde_json::to_string(&user.documents)?;

    sqlx::query(
        r#"
        INSERT INTO users (
            id, email, password_hash, role, status, category, first_name, last_name,
            phone, business_name, business_address, state, materials, machinery,
            monthly_volume, employees, date_joined, expiry_date, profile_image,
            documents, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(password_hash)
    .bind(role_to_str(&user.role))
    .bind(member_status_to_str(&user.status))
    .bind(&user.category)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.business_name)
    .bind(&user.business_address)
    .bind(&user.state)
    .bind(&user.materials)
    .bind(&user.machinery)
    .bind(user.monthly_volume)
    .bind(user.employees)
    .bind(user.date_joined)
    .bind(user.expiry_date)
    .bind(&user.profile_image)
    .bind(&documents)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| map_user_write_error(e, user))?;

    Ok(())
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User, password_hash: &str) -> Result<User> {
        insert_user(&self.pool, user, password_hash).await?;

        self.find_by_id(&user.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_where("email", email).await
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let password_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(password_hash) = password_hash else {
            return Ok(None);
        };

        Ok(self.find_by_email(email).await?.map(|user| (user, password_hash)))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users ORDER BY rowid", USER_COLUMNS)
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_user)
            .collect()
    }

    async fn save(&self, user: &User) -> Result<User> {
        let now = Utc::now().naive_utc();
        let documents = serde_json::to_string(&user.documents)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?,
                role = ?,
                status = ?,
                category = ?,
                first_name = ?,
                last_name = ?,
                phone = ?,
                business_name = ?,
                business_address = ?,
                state = ?,
                materials = ?,
                machinery = ?,
                monthly_volume = ?,
                employees = ?,
                expiry_date = ?,
                profile_image = ?,
                documents = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&user.email)
        .bind(role_to_str(&user.role))
        .bind(member_status_to_str(&user.status))
        .bind(&user.category)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.business_name)
        .bind(&user.business_address)
        .bind(&user.state)
        .bind(&user.materials)
        .bind(&user.machinery)
        .bind(user.monthly_volume)
        .bind(user.employees)
        .bind(user.expiry_date)
        .bind(&user.profile_image)
        .bind(&documents)
        .bind(now)
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_user_write_error(e, user))?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(user.id.clone()));
        }

        self.find_by_id(&user.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn set_status(&self, id: &str, status: MemberStatus) -> Result<User> {
        let result = sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(member_status_to_str(&status))
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(id.to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    async fn reassign_id(&self, current_id: &str, new_id: &str) -> Result<User> {
        if current_id == new_id {
            return self.find_by_id(current_id).await?
                .ok_or_else(|| AppError::UserNotFound(current_id.to_string()));
        }

        // Dropping the transaction on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
            .bind(new_id)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(AppError::IdAlreadyAssigned(new_id.to_string()));
        }

        let renamed = sqlx::query("UPDATE users SET id = ?, updated_at = ? WHERE id = ?")
            .bind(new_id)
            .bind(Utc::now().naive_utc())
            .bind(current_id)
            .execute(&mut *tx)
            .await?;
        if renamed.rows_affected() == 0 {
            return Err(AppError::UserNotFound(current_id.to_string()));
        }

        let payments = sqlx::query("UPDATE payments SET user_id = ? WHERE user_id = ?")
            .bind(new_id)
            .bind(current_id)
            .execute(&mut *tx)
            .await?;

        let sent = sqlx::query("UPDATE messages SET sender_id = ? WHERE sender_id = ?")
            .bind(new_id)
            .bind(current_id)
            .execute(&mut *tx)
            .await?;

        let received = sqlx::query("UPDATE messages SET receiver_id = ? WHERE receiver_id = ?")
            .bind(new_id)
            .bind(current_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE sessions SET user_id = ?, snapshot = json_set(snapshot, '$.id', ?) WHERE user_id = ?"
        )
        .bind(new_id)
        .bind(new_id)
        .bind(current_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Reassigned user {} to {} ({} payments, {} messages)",
            current_id,
            new_id,
            payments.rows_affected(),
            sent.rows_affected() + received.rows_affected(),
        );

        self.find_by_id(new_id).await?
            .ok_or_else(|| AppError::UserNotFound(new_id.to_string()))
    }
}
