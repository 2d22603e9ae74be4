use axum::{
    middleware,
    routing::get,
    Router,
};

use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    // ========================================
    // PROTECTED ROUTES
    // ========================================
    let protected = Router::new()
        .route("/logout", get(system::handlers::auth::logout))
        // D400 Overview
        .route("/", get(handlers::d400_overview::get_metrics))
        // A001 Agents
        .route(
            "/agents",
            get(handlers::a001_agent::list_all).post(handlers::a001_agent::create),
        )
        .route("/agents/:id", get(handlers::a001_agent::get_detail))
        // A003 Policies
        .route("/policies", get(handlers::a003_policy::list_all))
        .route(
            "/policies/new",
            get(handlers::a003_policy::new_policy_context).post(handlers::a003_policy::create),
        )
        .route(
            "/policies/:id",
            get(handlers::a003_policy::get_detail)
                .post(handlers::a003_policy::perform_action)
                .delete(handlers::a003_policy::delete),
        )
        .route(
            "/policies/:id/document.pdf",
            get(handlers::a003_policy::document),
        )
        // A005 Payments
        .route("/payments", get(handlers::a005_payment::list_recent))
        // D401 Reports
        .route(
            "/reports",
            get(handlers::d401_reports::get_reports).post(handlers::d401_reports::run_report),
        )
        .route_layer(middleware::from_fn(system::auth::middleware::require_auth));

    // ========================================
    // PUBLIC ROUTES
    // ========================================
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/login",
            get(system::handlers::auth::login_info).post(system::handlers::auth::login),
        )
        .merge(protected)
}
