//! One client-facing API over the portal, whether the services run in this
//! process or behind the HTTP surface.

use std::sync::Arc;
use async_trait::async_trait;

use crate::{
    config::{PortalMode, Settings},
    domain::*,
    error::Result,
    repository::RecordStore,
    service::{ServiceContext, SystemClock},
};

pub mod local;
pub mod poller;
pub mod remote;

pub use local::LocalPortal;
pub use poller::{InboxPoller, InboxSnapshot, PollerHandle};
pub use remote::RemotePortal;

#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User>;
    async fn logout(&self) -> Result<()>;
    /// The user record held by the current session, if any. It may be a
    /// reduced snapshot of the full record.
    async fn current_session(&self) -> Result<Option<serde_json::Value>>;
    async fn register(&self, request: RegisterRequest) -> Result<User>;

    async fn get_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, id: &str) -> Result<User>;
    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<User>;
    async fn update_user_status(&self, id: &str, status: MemberStatus) -> Result<User>;
    async fn reassign_user_id(&self, current_id: &str, new_id: &str) -> Result<User>;
    async fn issue_document(&self, id: &str, kind: IssuedDocument, document: String) -> Result<User>;
    async fn get_directory(&self, filter: &DirectoryFilter) -> Result<Vec<DirectoryEntry>>;

    async fn get_announcements(&self) -> Result<Vec<Announcement>>;
    async fn create_announcement(&self, request: CreateAnnouncementRequest) -> Result<Announcement>;
    async fn delete_announcement(&self, id: &str) -> Result<()>;

    async fn get_payments(&self, user_id: &str) -> Result<Vec<Payment>>;
    async fn get_all_payments(&self) -> Result<Vec<Payment>>;
    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<Payment>;
    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> Result<Payment>;
    async fn delete_payment(&self, id: &str) -> Result<()>;

    async fn send_message(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Message>;
    async fn get_conversation(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>>;
    async fn get_conversations(&self, user_id: &str) -> Result<Vec<User>>;
    async fn mark_messages_read(&self, user_id: &str, other_id: &str) -> Result<()>;
    async fn get_unread_count(&self, user_id: &str) -> Result<i64>;
}

/// Builds the portal the settings ask for. Local mode opens (and if needed
/// seeds) the configured database in this process.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn PortalApi>> {
    match settings.portal.mode {
        PortalMode::Local => {
            let store = RecordStore::open(&settings.database).await?;
            let context = Arc::new(ServiceContext::new(store, settings, Arc::new(SystemClock)));
            context.load_or_seed().await?;

            tracing::debug!("Using local portal on {}", settings.database.url);
            Ok(Arc::new(LocalPortal::new(
                context,
                settings.auth.session_snapshot_limit_bytes,
            )))
        }
        PortalMode::Remote => {
            tracing::debug!("Using remote portal at {}", settings.portal.remote_base_url);
            Ok(Arc::new(RemotePortal::new(&settings.portal.remote_base_url)?))
        }
    }
}
