#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use memberhub::{
    config::Settings,
    domain::RegisterRequest,
    repository::RecordStore,
    service::{FixedClock, ServiceContext},
};

pub const ADMIN_EMAIL: &str = "admin@association.org";
pub const ADMIN_PASSWORD: &str = "Admin@2024!";
pub const MEMBER_PASSWORD: &str = "Member@2024!";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

/// An empty in-memory store with "today" pinned.
pub async fn empty_context() -> anyhow::Result<Arc<ServiceContext>> {
    context_with(Settings::default()).await
}

pub async fn context_with(settings: Settings) -> anyhow::Result<Arc<ServiceContext>> {
    let store = RecordStore::in_memory().await?;
    Ok(Arc::new(ServiceContext::new(
        store,
        &settings,
        Arc::new(FixedClock::on(today())),
    )))
}

/// An in-memory store holding the factory defaults.
pub async fn seeded_context() -> anyhow::Result<Arc<ServiceContext>> {
    let context = empty_context().await?;
    context.load_or_seed().await?;
    Ok(context)
}

pub fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "Recycle#2025".to_string(),
        first_name: "Ngozi".to_string(),
        last_name: "Eze".to_string(),
        phone: "08031234567".to_string(),
        business_name: "Eze Metals".to_string(),
        business_address: "4 Wharf Road, Apapa".to_string(),
        business_category: "Corporate".to_string(),
        state: "Lagos".to_string(),
        materials: "Copper, brass".to_string(),
        machinery: "Shredder".to_string(),
        monthly_volume: Some(30.0),
        employees: Some(12.0),
        profile_image: None,
        documents: None,
    }
}
