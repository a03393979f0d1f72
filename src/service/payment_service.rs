use std::sync::Arc;
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    domain::{CreatePaymentRequest, Payment, PaymentStatus, DEFAULT_CURRENCY},
    error::{AppError, Result},
    repository::{PaymentRepository, UserRepository},
    service::clock::Clock,
    uploads::check_blob,
};

const REFERENCE_LEN: usize = 9;

/// Dues ledger. Payment status never feeds back into member status.
pub struct PaymentService {
    repo: Arc<dyn PaymentRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    max_receipt_bytes: usize,
}

impl PaymentService {
    pub fn new(
        repo: Arc<dyn PaymentRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        max_receipt_bytes: usize,
    ) -> Self {
        Self { repo, users, clock, max_receipt_bytes }
    }

    pub async fn create(&self, request: CreatePaymentRequest) -> Result<Payment> {
        if request.amount < 0 {
            return Err(AppError::ValidationFailed(vec![
                "amount must be a non-negative number".to_string(),
            ]));
        }
        if let Some(receipt) = &request.receipt {
            check_blob("receipt", receipt, self.max_receipt_bytes)?;
        }
        if self.users.find_by_id(&request.user_id).await?.is_none() {
            return Err(AppError::UserNotFound(request.user_id));
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            amount: request.amount,
            currency: request
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            date: request.date.unwrap_or_else(|| self.clock.today()),
            description: request.description,
            status: request.status.unwrap_or(PaymentStatus::Successful),
            reference: generate_reference(),
            receipt: request.receipt,
        };

        let created = self.repo.create(&payment).await?;
        tracing::info!(
            "Recorded payment {} of {} {} for {} ({:?})",
            created.reference,
            created.amount,
            created.currency,
            created.user_id,
            created.status
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Payment> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(id.to_string()))
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>> {
        self.repo.list_by_user(user_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Payment>> {
        self.repo.list_all().await
    }

    pub async fn update_status(&self, id: &str, status: PaymentStatus) -> Result<Payment> {
        let payment = self.repo.update_status(id, status).await?;
        tracing::info!("Payment {} marked {:?}", id, status);
        Ok(payment)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(id).await
    }
}

/// `REF-` followed by nine uppercase alphanumerics.
pub fn generate_reference() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_LEN)
        .map(char::from)
        .collect();
    format!("REF-{}", suffix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        let reference = generate_reference();
        let suffix = reference.strip_prefix("REF-").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
