use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    auth::{snapshot_user, SessionSnapshot},
    domain::*,
    error::{AppError, Result},
    portal::PortalApi,
    service::ServiceContext,
};

struct LocalSession {
    user_id: String,
    is_admin: bool,
    snapshot: SessionSnapshot,
}

/// Calls the services in process and keeps the session in memory. A
/// logged-in user is held to the same access rules as on the HTTP
/// surface; calls without a session are trusted.
pub struct LocalPortal {
    context: Arc<ServiceContext>,
    snapshot_limit: usize,
    session: RwLock<Option<LocalSession>>,
}

impl LocalPortal {
    pub fn new(context: Arc<ServiceContext>, snapshot_limit: usize) -> Self {
        Self {
            context,
            snapshot_limit,
            session: RwLock::new(None),
        }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.context
    }

    /// The member acting through this portal, unless it is an administrator
    /// or nobody is logged in.
    async fn acting_member(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_admin)
            .map(|s| s.user_id.clone())
    }

    async fn ensure_admin(&self) -> Result<()> {
        match self.acting_member().await {
            Some(_) => Err(AppError::Forbidden),
            None => Ok(()),
        }
    }

    async fn ensure_self_or_admin(&self, user_id: &str) -> Result<()> {
        match self.acting_member().await {
            Some(member) if member != user_id => Err(AppError::Forbidden),
            _ => Ok(()),
        }
    }

    /// Messages are read and sent only as oneself, administrators included.
    async fn ensure_self(&self, user_id: &str) -> Result<()> {
        match self.session.read().await.as_ref() {
            Some(session) if session.user_id != user_id => Err(AppError::Forbidden),
            _ => Ok(()),
        }
    }

    /// Re-snapshots the session after its own user record changed.
    async fn refresh_session(&self, user: &User) -> Result<()> {
        let mut session = self.session.write().await;
        if let Some(current) = session.as_mut().filter(|s| s.user_id == user.id) {
            current.snapshot = snapshot_user(user, self.snapshot_limit)?;
            current.is_admin = user.is_admin();
        }
        Ok(())
    }
}

#[async_trait]
impl PortalApi for LocalPortal {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.context.member_service.login(email, password).await?;
        let snapshot = snapshot_user(&user, self.snapshot_limit)?;

        *self.session.write().await = Some(LocalSession {
            user_id: user.id.clone(),
            is_admin: user.is_admin(),
            snapshot,
        });
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<serde_json::Value>> {
        match self.session.read().await.as_ref() {
            Some(session) => Ok(Some(serde_json::from_str(&session.snapshot.json)?)),
            None => Ok(None),
        }
    }

    async fn register(&self, request: RegisterRequest) -> Result<User> {
        self.context.member_service.register(request).await
    }

    async fn get_users(&self) -> Result<Vec<User>> {
        self.ensure_admin().await?;
        self.context.member_service.get_users().await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        self.ensure_self_or_admin(id).await?;
        self.context.member_service.get_user(id).await
    }

    async fn update_user(&self, id: &str, update: UpdateUserRequest) -> Result<User> {
        if let Some(member) = self.acting_member().await {
            if member != id || update.touches_admin_fields() {
                return Err(AppError::Forbidden);
            }
        }

        let user = self.context.member_service.update_user(id, update).await?;
        self.refresh_session(&user).await?;
        Ok(user)
    }

    async fn update_user_status(&self, id: &str, status: MemberStatus) -> Result<User> {
        self.ensure_admin().await?;
        self.context.member_service.update_status(id, status).await
    }

    async fn reassign_user_id(&self, current_id: &str, new_id: &str) -> Result<User> {
        self.ensure_admin().await?;
        let user = self.context.member_service.reassign_id(current_id, new_id).await?;

        // A session opened under the old id follows the user to the new one.
        let mut session = self.session.write().await;
        if let Some(current) = session.as_mut().filter(|s| s.user_id == current_id) {
            let mut snapshot: serde_json::Value = serde_json::from_str(&current.snapshot.json)?;
            snapshot["id"] = serde_json::Value::String(user.id.clone());
            current.snapshot.json = serde_json::to_string(&snapshot)?;
            current.user_id = user.id.clone();
        }

        Ok(user)
    }

    async fn issue_document(&self, id: &str, kind: IssuedDocument, document: String) -> Result<User> {
        self.ensure_admin().await?;
        let user = self.context.member_service.issue_document(id, kind, document).await?;
        self.refresh_session(&user).await?;
        Ok(user)
    }

    async fn get_directory(&self, filter: &DirectoryFilter) -> Result<Vec<DirectoryEntry>> {
        self.context.member_service.directory(filter).await
    }

    async fn get_announcements(&self) -> Result<Vec<Announcement>> {
        self.context.announcement_service.list().await
    }

    async fn create_announcement(&self, request: CreateAnnouncementRequest) -> Result<Announcement> {
        self.ensure_admin().await?;
        self.context.announcement_service.create(request).await
    }

    async fn delete_announcement(&self, id: &str) -> Result<()> {
        self.ensure_admin().await?;
        self.context.announcement_service.delete(id).await
    }

    async fn get_payments(&self, user_id: &str) -> Result<Vec<Payment>> {
        self.ensure_self_or_admin(user_id).await?;
        self.context.payment_service.list_by_user(user_id).await
    }

    async fn get_all_payments(&self) -> Result<Vec<Payment>> {
        self.ensure_admin().await?;
        self.context.payment_service.list_all().await
    }

    async fn create_payment(&self, mut request: CreatePaymentRequest) -> Result<Payment> {
        if let Some(member) = self.acting_member().await {
            if member != request.user_id {
                return Err(AppError::Forbidden);
            }
            request.status = Some(PaymentStatus::Pending);
        }

        self.context.payment_service.create(request).await
    }

    async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> Result<Payment> {
        self.ensure_admin().await?;
        self.context.payment_service.update_status(id, status).await
    }

    async fn delete_payment(&self, id: &str) -> Result<()> {
        self.ensure_admin().await?;
        self.context.payment_service.delete(id).await
    }

    async fn send_message(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Message> {
        self.ensure_self(sender_id).await?;
        self.context.message_service.send(sender_id, receiver_id, content).await
    }

    async fn get_conversation(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>> {
        self.ensure_self(user_id).await?;
        self.context.message_service.conversation(user_id, other_id).await
    }

    async fn get_conversations(&self, user_id: &str) -> Result<Vec<User>> {
        self.ensure_self(user_id).await?;
        self.context.message_service.counterparts(user_id).await
    }

    async fn mark_messages_read(&self, user_id: &str, other_id: &str) -> Result<()> {
        self.ensure_self(user_id).await?;
        self.context.message_service.mark_read(user_id, other_id).await?;
        Ok(())
    }

    async fn get_unread_count(&self, user_id: &str) -> Result<i64> {
        self.ensure_self(user_id).await?;
        self.context.message_service.unread_count(user_id).await
    }
}
