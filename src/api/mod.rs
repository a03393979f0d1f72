pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put, delete},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/announcements", announcement_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/messages", message_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .route(
            "/directory",
            get(handlers::directory::list).route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            )),
        )
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route("/session", get(handlers::auth::session))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Self or admin, checked per handler
        .route("/:id", get(handlers::users::get).put(handlers::users::update))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ))
        .merge(Router::new()
            .route("/", get(handlers::users::list))
            .route("/:id/status", put(handlers::users::update_status))
            .route("/:id/reassign", put(handlers::users::reassign))
            .route("/:id/documents/:kind", put(handlers::users::issue_document))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_admin,
            ))
        )
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    let admin = axum::middleware::from_fn_with_state(state, middleware::auth::require_admin);

    Router::new()
        // Anyone may read; only administrators publish or delete
        .route(
            "/",
            get(handlers::announcements::list)
                .merge(post(handlers::announcements::create).route_layer(admin.clone())),
        )
        .route(
            "/:id",
            delete(handlers::announcements::delete).route_layer(admin),
        )
}

fn payment_routes(state: AppState) -> Router<AppState> {
    let auth = axum::middleware::from_fn_with_state(state.clone(), middleware::auth::require_auth);
    let admin = axum::middleware::from_fn_with_state(state, middleware::auth::require_admin);

    Router::new()
        .route(
            "/",
            get(handlers::payments::list_all)
                .route_layer(admin.clone())
                .merge(post(handlers::payments::create).route_layer(auth.clone())),
        )
        .route(
            "/user/:user_id",
            get(handlers::payments::list_by_user).route_layer(auth),
        )
        .route(
            "/:id/status",
            put(handlers::payments::update_status).route_layer(admin.clone()),
        )
        .route(
            "/:id",
            delete(handlers::payments::delete).route_layer(admin),
        )
}

fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::messages::send))
        .route("/conversations/:user_id", get(handlers::messages::conversations))
        .route("/unread/:user_id", get(handlers::messages::unread))
        .route("/:user_id/:other_id", get(handlers::messages::conversation))
        .route("/:user_id/:other_id/read", post(handlers::messages::mark_read))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .route("/expired-check", post(handlers::admin::check_expired))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
