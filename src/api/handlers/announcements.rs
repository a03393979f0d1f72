use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::state::AppState,
    domain::{Announcement, CreateAnnouncementRequest},
    error::Result,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_service.list().await?;
    Ok(Json(announcements))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let announcement = state.service_context.announcement_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service_context.announcement_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
