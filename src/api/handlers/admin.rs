use axum::{
    extract::State,
    Json,
};

use crate::{
    api::state::AppState,
    domain::User,
    error::Result,
    service::DashboardStats,
};

pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = state.service_context.dashboard_stats().await?;
    Ok(Json(stats))
}

/// Runs the expiry sweep now and returns the members it moved to Expired.
pub async fn check_expired(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let expired = state.service_context.member_service.check_expired().await?;
    tracing::info!("Expiry sweep moved {} members to Expired", expired.len());
    Ok(Json(expired))
}
