use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Message, SendMessageRequest, UnreadCount, User},
    error::Result,
};

pub async fn send(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    current.ensure_self(&req.sender_id)?;

    let message = state.service_context.message_service
        .send(&req.sender_id, &req.receiver_id, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn conversations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<User>>> {
    current.ensure_self(&user_id)?;

    let users = state.service_context.message_service.counterparts(&user_id).await?;
    Ok(Json(users))
}

pub async fn conversation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((user_id, other_id)): Path<(String, String)>,
) -> Result<Json<Vec<Message>>> {
    current.ensure_self(&user_id)?;

    let messages = state.service_context.message_service
        .conversation(&user_id, &other_id)
        .await?;
    Ok(Json(messages))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((user_id, other_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    current.ensure_self(&user_id)?;

    state.service_context.message_service.mark_read(&user_id, &other_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unread(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UnreadCount>> {
    current.ensure_self(&user_id)?;

    let count = state.service_context.message_service.unread_count(&user_id).await?;
    Ok(Json(UnreadCount { count }))
}
