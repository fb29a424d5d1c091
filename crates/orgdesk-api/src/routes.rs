//! API route definitions

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{access, audit, customization, departments, health, requests, templates},
    middleware::logging_middleware,
    state::AppState,
};

/// API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Access requests
        .route(
            "/api/v1/access-requests",
            get(requests::list_requests).post(requests::submit_request),
        )
        .route("/api/v1/access-requests/summary", get(requests::queue_summary))
        .route("/api/v1/access-requests/bulk-review", post(requests::bulk_review))
        .route("/api/v1/access-requests/:id/cancel", post(requests::cancel_request))
        .route("/api/v1/access-requests/:id/review", post(requests::review_request))
        // Access checks and grants
        .route("/api/v1/access/check", get(access::check_access))
        .route(
            "/api/v1/users/:user_id/permissions",
            get(access::list_user_permissions),
        )
        .route("/api/v1/permissions/grant", post(access::grant_permissions))
        .route("/api/v1/permissions/revoke", post(access::revoke_permission))
        .route("/api/v1/permissions/sweep", post(access::sweep_expired))
        // Templates
        .route(
            "/api/v1/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/v1/templates/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        // Audit trail
        .route("/api/v1/audit", get(audit::fetch_audit_trail))
        .route("/api/v1/audit/export", get(audit::export_audit_csv))
        // Department sections
        .route(
            "/api/v1/departments/:department_id/:section",
            get(departments::list_section).post(departments::create_item),
        )
        .route(
            "/api/v1/departments/:department_id/:section/reorder",
            post(departments::reorder_section),
        )
        .route(
            "/api/v1/departments/:department_id/:section/:item_id",
            put(departments::update_item).delete(departments::delete_item),
        )
        // Customization
        .route(
            "/api/v1/customization",
            get(customization::get_customization)
                .put(customization::save_customization)
                .delete(customization::reset_customization),
        )
}

/// Routes with state, logging, tracing and CORS applied
pub fn app(state: AppState) -> Router {
    api_routes()
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
