use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Message, User},
    error::{AppError, Result},
    repository::{MessageRepository, UserRepository},
    service::{clock::Clock, lifecycle},
};

pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl MessageService {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, users, clock }
    }

    pub async fn send(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(AppError::ValidationFailed(vec!["content is required".to_string()]));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            timestamp: self.clock.now(),
            is_read: false,
        };

        let sent = self.repo.create(&message).await?;
        tracing::debug!("Message {} from {} to {}", sent.id, sender_id, receiver_id);
        Ok(sent)
    }

    /// Both directions, oldest first.
    pub async fn conversation(&self, user_id: &str, other_id: &str) -> Result<Vec<Message>> {
        self.repo.list_between(user_id, other_id).await
    }

    /// Everyone `user_id` has exchanged messages with, most recent
    /// exchange first. Ids that no longer resolve to a user are skipped.
    pub async fn counterparts(&self, user_id: &str) -> Result<Vec<User>> {
        let today = self.clock.today();
        let mut users = Vec::new();

        for id in self.repo.counterpart_ids(user_id).await? {
            match self.users.find_by_id(&id).await? {
                Some(mut user) => {
                    lifecycle::apply_expiry(&mut user, today);
                    users.push(user);
                }
                None => tracing::debug!("Skipping unknown conversation partner {}", id),
            }
        }

        Ok(users)
    }

    /// Marks what `other_id` sent to `user_id` as read.
    pub async fn mark_read(&self, user_id: &str, other_id: &str) -> Result<u64> {
        self.repo.mark_read(user_id, other_id).await
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        self.repo.unread_count(user_id).await
    }
}
