//! View Server Route Configuration

use axum::{
    extract::{DefaultBodyLimit, Json, Path, Query},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::context::{AppState, ViewContext};
use super::handlers;
use super::middleware::{admin_guard_middleware, logging_middleware, rate_limit_middleware};
use super::types::TableQuery;
use crate::models::types::FinancePayload;
use crate::services::keuangan::FinanceKind;

/// Room for several 2 MiB complaint attachments
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Income and expense pages share one set of handlers
fn finance_routes(kind: FinanceKind) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(move |ctx: ViewContext, body: Json<FinancePayload>| handlers::finance_create(kind, ctx, body)),
        )
        .route(
            "/detail",
            get(move |ctx: ViewContext, query: Query<TableQuery>| handlers::finance_detail(kind, ctx, query)),
        )
        .route(
            "/:id",
            delete(move |ctx: ViewContext, id: Path<String>| handlers::finance_delete(kind, ctx, id)),
        )
}

/// Create the view router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/fasilitas", get(handlers::public_facilities))
        .route("/potensi", get(handlers::public_potentials))
        .route("/apbdesa/pdf/:year", get(handlers::apbdesa_pdf))
        .route("/pengaduan", post(handlers::submit_complaint));

    let admin = Router::new()
        .route("/dashboard", get(handlers::admin_dashboard))
        .route("/user", get(handlers::current_user))
        .route("/idm", get(handlers::admin_idm).post(handlers::idm_create))
        .route("/idm/:id", delete(handlers::idm_delete))
        .route("/pengaduan", get(handlers::admin_complaints))
        .route("/pengaduan/:id", delete(handlers::complaint_delete))
        .route("/pengaduan/:id/status", put(handlers::complaint_status))
        .route(
            "/fasilitas",
            get(handlers::admin_facilities).post(handlers::facility_create),
        )
        .route(
            "/fasilitas/:id",
            get(handlers::facility_edit)
                .put(handlers::facility_update)
                .delete(handlers::facility_delete),
        )
        .nest("/pendapatan", finance_routes(FinanceKind::Pendapatan))
        .nest("/belanja", finance_routes(FinanceKind::Belanja));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .nest("/publik", public)
        .nest("/admin", admin)
        // Middleware (order matters - bottom runs first)
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}
