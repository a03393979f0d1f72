use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreatePaymentRequest, Payment, PaymentStatus, UpdatePaymentStatusRequest},
    error::Result,
};

pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Payment>>> {
    let payments = state.service_context.payment_service.list_all().await?;
    Ok(Json(payments))
}

pub async fn list_by_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Payment>>> {
    current.ensure_self_or_admin(&user_id)?;

    let payments = state.service_context.payment_service.list_by_user(&user_id).await?;
    Ok(Json(payments))
}

/// Members submit payments for themselves and always start Pending until
/// an administrator confirms them.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(mut req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>)> {
    if !current.is_admin() {
        current.ensure_self(&req.user_id)?;
        req.status = Some(PaymentStatus::Pending);
    }

    let payment = state.service_context.payment_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Payment>> {
    let payment = state.service_context.payment_service
        .update_status(&id, req.status)
        .await?;
    Ok(Json(payment))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service_context.payment_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
