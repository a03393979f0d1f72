mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use memberhub::{api, config::Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn app() -> anyhow::Result<Router> {
    let context = common::seeded_context().await?;
    Ok(api::create_app(context, Arc::new(Settings::default())))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<Reply> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok(Reply { status, cookie, body })
}

async fn login(app: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let reply = call(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await?;
    assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
    reply.cookie.ok_or_else(|| anyhow::anyhow!("no session cookie"))
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = app().await?;
    let reply = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_login_sets_session_and_logout_ends_it() -> anyhow::Result<()> {
    let app = app().await?;
    let cookie = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;
    assert!(cookie.starts_with("session="));

    let me = call(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], "ADM-001");
    assert_eq!(me.body["role"], "ADMIN");

    let snapshot = call(&app, Method::GET, "/api/auth/session", Some(&cookie), None).await?;
    assert_eq!(snapshot.body["email"], common::ADMIN_EMAIL);

    let logout = call(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await?;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let after = call(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await?;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.body["code"], "UNAUTHORIZED");

    Ok(())
}

#[tokio::test]
async fn test_login_failures_carry_their_codes() -> anyhow::Result<()> {
    let app = app().await?;

    let pending = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "amina@bellorecycling.ng", "password": common::MEMBER_PASSWORD })),
    )
    .await?;
    assert_eq!(pending.status, StatusCode::FORBIDDEN);
    assert_eq!(pending.body["code"], "ACCOUNT_PENDING");

    let wrong = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": common::ADMIN_EMAIL, "password": "nope" })),
    )
    .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["code"], "INVALID_CREDENTIALS");
    assert!(wrong.cookie.is_none());

    Ok(())
}

#[tokio::test]
async fn test_register_reports_violations() -> anyhow::Result<()> {
    let app = app().await?;

    let mut payload = serde_json::to_value(common::registration("new@member.ng"))?;
    let created = call(&app, Method::POST, "/api/auth/register", None, Some(payload.clone())).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "Pending");

    payload["email"] = json!("second@member.ng");
    payload["phone"] = json!("12");
    let invalid = call(&app, Method::POST, "/api/auth/register", None, Some(payload)).await?;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["code"], "VALIDATION_FAILED");
    assert_eq!(invalid.body["errors"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_members_cannot_reach_admin_routes() -> anyhow::Result<()> {
    let app = app().await?;

    let anonymous = call(&app, Method::GET, "/api/users", None, None).await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let member = login(&app, "chinedu@okaformetals.ng", common::MEMBER_PASSWORD).await?;

    let users = call(&app, Method::GET, "/api/users", Some(&member), None).await?;
    assert_eq!(users.status, StatusCode::FORBIDDEN);

    let other = call(&app, Method::GET, "/api/users/MEM-002", Some(&member), None).await?;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    let own = call(&app, Method::GET, "/api/users/MEM-001", Some(&member), None).await?;
    assert_eq!(own.status, StatusCode::OK);

    let stats = call(&app, Method::GET, "/api/admin/stats", Some(&member), None).await?;
    assert_eq!(stats.status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_member_profile_edits() -> anyhow::Result<()> {
    let app = app().await?;
    let member = login(&app, "chinedu@okaformetals.ng", common::MEMBER_PASSWORD).await?;

    let promote = call(
        &app,
        Method::PUT,
        "/api/users/MEM-001",
        Some(&member),
        Some(json!({ "role": "ADMIN" })),
    )
    .await?;
    assert_eq!(promote.status, StatusCode::FORBIDDEN);

    let edit = call(
        &app,
        Method::PUT,
        "/api/users/MEM-001",
        Some(&member),
        Some(json!({ "machinery": "Baler, crusher" })),
    )
    .await?;
    assert_eq!(edit.status, StatusCode::OK);
    assert_eq!(edit.body["machinery"], "Baler, crusher");
    assert_eq!(edit.body["role"], "MEMBER");

    Ok(())
}

#[tokio::test]
async fn test_member_payments_start_pending() -> anyhow::Result<()> {
    let app = app().await?;
    let member = login(&app, "chinedu@okaformetals.ng", common::MEMBER_PASSWORD).await?;

    let paid = call(
        &app,
        Method::POST,
        "/api/payments",
        Some(&member),
        Some(json!({
            "userId": "MEM-001",
            "amount": 150000,
            "description": "Renewal",
            "status": "Successful"
        })),
    )
    .await?;
    assert_eq!(paid.status, StatusCode::CREATED);
    assert_eq!(paid.body["status"], "Pending");

    let for_someone_else = call(
        &app,
        Method::POST,
        "/api/payments",
        Some(&member),
        Some(json!({ "userId": "MEM-002", "amount": 1, "description": "Gift" })),
    )
    .await?;
    assert_eq!(for_someone_else.status, StatusCode::FORBIDDEN);

    let history = call(&app, Method::GET, "/api/payments/user/MEM-001", Some(&member), None).await?;
    assert_eq!(history.body.as_array().map(Vec::len), Some(2));

    let admin = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;
    let missing = call(
        &app,
        Method::PUT,
        "/api/payments/PAY-404/status",
        Some(&admin),
        Some(json!({ "status": "Successful" })),
    )
    .await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "PAYMENT_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_admin_reassign_and_expiry_sweep() -> anyhow::Result<()> {
    let app = app().await?;
    let admin = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;

    let taken = call(
        &app,
        Method::PUT,
        "/api/users/MEM-001/reassign",
        Some(&admin),
        Some(json!({ "newId": "MEM-002" })),
    )
    .await?;
    assert_eq!(taken.status, StatusCode::CONFLICT);
    assert_eq!(taken.body["code"], "ID_ALREADY_ASSIGNED");
    assert_eq!(taken.body["subject"], "MEM-002");

    let renamed = call(
        &app,
        Method::PUT,
        "/api/users/MEM-001/reassign",
        Some(&admin),
        Some(json!({ "newId": "NAMR/0001" })),
    )
    .await?;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["id"], "NAMR/0001");

    let sweep = call(&app, Method::POST, "/api/admin/expired-check", Some(&admin), None).await?;
    assert_eq!(sweep.status, StatusCode::OK);
    assert_eq!(sweep.body[0]["id"], "MEM-003");

    let stats = call(&app, Method::GET, "/api/admin/stats", Some(&admin), None).await?;
    assert_eq!(stats.body["expired"], 1);
    assert_eq!(stats.body["totalRevenue"], 150000);

    Ok(())
}

#[tokio::test]
async fn test_reassigned_member_keeps_their_session() -> anyhow::Result<()> {
    let app = app().await?;
    let member = login(&app, "chinedu@okaformetals.ng", common::MEMBER_PASSWORD).await?;
    let admin = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;

    call(
        &app,
        Method::PUT,
        "/api/users/MEM-001/reassign",
        Some(&admin),
        Some(json!({ "newId": "NAMR-0001" })),
    )
    .await?;

    let me = call(&app, Method::GET, "/api/auth/me", Some(&member), None).await?;
    assert_eq!(me.body["id"], "NAMR-0001");

    let snapshot = call(&app, Method::GET, "/api/auth/session", Some(&member), None).await?;
    assert_eq!(snapshot.body["id"], "NAMR-0001");

    Ok(())
}

#[tokio::test]
async fn test_messaging_routes() -> anyhow::Result<()> {
    let app = app().await?;
    let member = login(&app, "chinedu@okaformetals.ng", common::MEMBER_PASSWORD).await?;
    let admin = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;

    let spoofed = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(&member),
        Some(json!({ "senderId": "ADM-001", "receiverId": "MEM-001", "content": "hi" })),
    )
    .await?;
    assert_eq!(spoofed.status, StatusCode::FORBIDDEN);

    let sent = call(
        &app,
        Method::POST,
        "/api/messages",
        Some(&member),
        Some(json!({ "senderId": "MEM-001", "receiverId": "ADM-001", "content": "When is the AGM?" })),
    )
    .await?;
    assert_eq!(sent.status, StatusCode::CREATED);

    let unread = call(&app, Method::GET, "/api/messages/unread/ADM-001", Some(&admin), None).await?;
    assert_eq!(unread.body["count"], 1);

    let threads = call(&app, Method::GET, "/api/messages/conversations/ADM-001", Some(&admin), None).await?;
    assert_eq!(threads.body[0]["id"], "MEM-001");

    let read = call(&app, Method::POST, "/api/messages/ADM-001/MEM-001/read", Some(&admin), None).await?;
    assert_eq!(read.status, StatusCode::NO_CONTENT);

    let conversation = call(&app, Method::GET, "/api/messages/ADM-001/MEM-001", Some(&admin), None).await?;
    assert_eq!(conversation.body[0]["isRead"], true);

    Ok(())
}

#[tokio::test]
async fn test_announcements_are_public_but_admin_managed() -> anyhow::Result<()> {
    let app = app().await?;

    let list = call(&app, Method::GET, "/api/announcements", None, None).await?;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body.as_array().map(Vec::len), Some(3));

    let anonymous = call(
        &app,
        Method::POST,
        "/api/announcements",
        None,
        Some(json!({ "title": "x", "content": "y" })),
    )
    .await?;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let admin = login(&app, common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;
    let created = call(
        &app,
        Method::POST,
        "/api/announcements",
        Some(&admin),
        Some(json!({ "title": "AGM", "content": "Holds on Friday", "isImportant": true })),
    )
    .await?;
    assert_eq!(created.status, StatusCode::CREATED);

    let removed = call(&app, Method::DELETE, "/api/announcements/ANN-001", Some(&admin), None).await?;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let list = call(&app, Method::GET, "/api/announcements", None, None).await?;
    assert_eq!(list.body[0]["title"], "AGM");
    assert_eq!(list.body.as_array().map(Vec::len), Some(3));

    Ok(())
}
