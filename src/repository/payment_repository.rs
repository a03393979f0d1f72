use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{SqlitePool, SqliteExecutor, FromRow};

use crate::{
    domain::{Payment, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    user_id: String,
    amount: i64,
    currency: String,
    date: NaiveDate,
    description: String,
    status: String,
    reference: String,
    receipt: Option<String>,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            status: parse_payment_status(&row.status)?,
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            currency: row.currency,
            date: row.date,
            description: row.description,
            reference: row.reference,
            receipt: row.receipt,
        })
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
    match s {
        "Successful" => Ok(PaymentStatus::Successful),
        "Pending" => Ok(PaymentStatus::Pending),
        "Failed" => Ok(PaymentStatus::Failed),
        _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
    }
}

fn payment_status_to_str(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Successful => "Successful",
        PaymentStatus::Pending => "Pending",
        PaymentStatus::Failed => "Failed",
    }
}

pub(crate) async fn insert_payment<'e, E>(executor: E, payment: &Payment) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, user_id, amount, currency, date, description,
            status, reference, receipt, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(&payment.id)
    .bind(&payment.user_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(payment.date)
    .bind(&payment.description)
    .bind(payment_status_to_str(&payment.status))
    .bind(&payment.reference)
    .bind(&payment.receipt)
    .bind(Utc::now().naive_utc())
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment> {
        insert_payment(&self.pool, payment).await?;

        self.find_by_id(&payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, user_id, amount, currency, date, description,
                   status, reference, receipt
            FROM payments
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_payment).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, user_id, amount, currency, date, description,
                   status, reference, receipt
            FROM payments
            WHERE user_id = ?
            ORDER BY rowid DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_payment)
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, user_id, amount, currency, date, description,
                   status, reference, receipt
            FROM payments
            ORDER BY rowid DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_payment)
            .collect()
    }

    async fn update_status(&self, id: &str, status: PaymentStatus) -> Result<Payment> {
        let result = sqlx::query("UPDATE payments SET status = ? WHERE id = ?")
            .bind(payment_status_to_str(&status))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PaymentNotFound(id.to_string()));
        }

        self.find_by_id(id).await?
            .ok_or_else(|| AppError::PaymentNotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
