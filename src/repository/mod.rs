use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod store;
pub mod defaults;
pub mod user_repository;
pub mod payment_repository;
pub mod message_repository;
pub mod announcement_repository;

pub use store::RecordStore;
pub use user_repository::SqliteUserRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use message_repository::SqliteMessageRepository;
pub use announcement_repository::SqliteAnnouncementRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, user: &User, password_hash: &str) -> Result<User>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// The user together with the stored credential, for login.
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Overwrites every mutable column except the id and the credential.
    async fn save(&self, user: &User) -> Result<User>;
    async fn set_status(&self, id: &str, status: MemberStatus) -> Result<User>;
    /// Renames a user and rewrites every payment, message and session
    /// that points at the old id, in one transaction.
    async fn reassign_id(&self, current_id: &str, new_id: &str) -> Result<User>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>>;
    async fn list_all(&self) -> Result<Vec<Payment>>;
    async fn update_status(&self, id: &str, status: PaymentStatus) -> Result<Payment>;
    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<Message>;
    async fn list_between(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>>;
    async fn counterpart_ids(&self, user_id: &str) -> Result<Vec<String>>;
    async fn mark_read(&self, receiver_id: &str, sender_id: &str) -> Result<u64>;
    async fn unread_count(&self, receiver_id: &str) -> Result<i64>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: &Announcement) -> Result<Announcement>;
    async fn list(&self) -> Result<Vec<Announcement>>;
    async fn delete(&self, id: &str) -> Result<()>;
}
