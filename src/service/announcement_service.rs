use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Announcement, CreateAnnouncementRequest},
    error::{AppError, Result},
    repository::AnnouncementRepository,
    service::clock::Clock,
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    clock: Arc<dyn Clock>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, request: CreateAnnouncementRequest) -> Result<Announcement> {
        let mut errors = Vec::new();
        if request.title.trim().is_empty() {
            errors.push("title is required".to_string());
        }
        if request.content.trim().is_empty() {
            errors.push("content is required".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        let announcement = Announcement {
            id: Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            content: request.content,
            date: self.clock.today(),
            is_important: request.is_important,
        };

        let created = self.repo.create(&announcement).await?;
        tracing::info!("Published announcement {}: {}", created.id, created.title);
        Ok(created)
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Announcement>> {
        self.repo.list().await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(id).await
    }
}
