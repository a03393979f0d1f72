pub mod clock;
pub mod lifecycle;
pub mod validation;
pub mod member_service;
pub mod payment_service;
pub mod message_service;
pub mod announcement_service;
pub mod dashboard;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::error::Result;

pub use clock::{Clock, FixedClock, SystemClock};
pub use member_service::MemberService;
pub use payment_service::PaymentService;
pub use message_service::MessageService;
pub use announcement_service::AnnouncementService;
pub use dashboard::DashboardStats;

pub struct ServiceContext {
    pub store: RecordStore,
    pub member_service: Arc<MemberService>,
    pub payment_service: Arc<PaymentService>,
    pub message_service: Arc<MessageService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub auth_service: Arc<AuthService>,
    pub clock: Arc<dyn Clock>,
}

impl ServiceContext {
    pub fn new(store: RecordStore, settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let db_pool = store.pool().clone();

        // Create repositories
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let message_repo: Arc<dyn MessageRepository> =
            Arc::new(SqliteMessageRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));

        let member_service = Arc::new(MemberService::new(
            user_repo.clone(),
            clock.clone(),
            settings.uploads.clone(),
        ));
        let payment_service = Arc::new(PaymentService::new(
            payment_repo,
            user_repo.clone(),
            clock.clone(),
            settings.uploads.max_receipt_bytes,
        ));
        let message_service = Arc::new(MessageService::new(message_repo, user_repo, clock.clone()));
        let announcement_service = Arc::new(AnnouncementService::new(announcement_repo, clock.clone()));
        let auth_service = Arc::new(AuthService::new(
            db_pool,
            settings.auth.session_duration_hours,
            settings.auth.session_snapshot_limit_bytes,
        ));

        Self {
            store,
            member_service,
            payment_service,
            message_service,
            announcement_service,
            auth_service,
            clock,
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        self.store.pool()
    }

    /// Seeds any collection that has no marker yet.
    pub async fn load_or_seed(&self) -> Result<()> {
        let seeded = self.store.load_or_seed(self.clock.today()).await?;
        for collection in seeded {
            tracing::info!("Initialised {} with defaults", collection.as_str());
        }
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let users = self.member_service.get_users().await?;
        let payments = self.payment_service.list_all().await?;
        Ok(dashboard::compute(&users, &payments, self.clock.today()))
    }
}
