use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{IssuedDocument, MemberStatus, UpdateUserRequest, User},
    error::{AppError, Result},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: MemberStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignRequest {
    pub new_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssueDocumentRequest {
    pub document: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.service_context.member_service.get_users().await?;
    Ok(Json(users))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    current.ensure_self_or_admin(&id)?;

    let user = state.service_context.member_service.get_user(&id).await?;
    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    current.ensure_self_or_admin(&id)?;

    if !current.is_admin() && req.touches_admin_fields() {
        tracing::warn!("{} tried to change administrator-only fields of {}", current.user.id, id);
        return Err(AppError::Forbidden);
    }

    let user = state.service_context.member_service.update_user(&id, req).await?;
    Ok(Json(user))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.member_service
        .update_status(&id, req.status)
        .await?;
    Ok(Json(user))
}

pub async fn reassign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReassignRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.member_service
        .reassign_id(&id, &req.new_id)
        .await?;
    Ok(Json(user))
}

pub async fn issue_document(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, IssuedDocument)>,
    Json(req): Json<IssueDocumentRequest>,
) -> Result<Json<User>> {
    let user = state.service_context.member_service
        .issue_document(&id, kind, req.document)
        .await?;
    Ok(Json(user))
}
