use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "MemberHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Membership portal for trade associations",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth/login",
            "directory": "/api/directory",
            "admin": "/api/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
