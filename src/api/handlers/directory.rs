use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    api::state::AppState,
    domain::{DirectoryEntry, DirectoryFilter},
    error::Result,
};

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<DirectoryFilter>,
) -> Result<Json<Vec<DirectoryEntry>>> {
    let entries = state.service_context.member_service.directory(&filter).await?;
    Ok(Json(entries))
}
