//! Audit trail query and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use orgdesk_permissions::AuditPage;

use crate::{actor::Actor, error::ApiResult, models::AuditQuery, state::AppState};

pub async fn fetch_audit_trail(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<AuditPage>> {
    let pagination = query.pagination(state.permissions.default_pagination());
    let page = state
        .permissions
        .fetch_audit_trail(&ctx, &query.filter(), pagination)
        .await?;
    Ok(Json(page))
}

pub async fn export_audit_csv(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<AuditQuery>,
) -> ApiResult<impl IntoResponse> {
    let csv = state
        .permissions
        .export_audit_csv(&ctx, &query.filter())
        .await?;
    let filename = format!(
        "attachment; filename=\"permission-audit-{}.csv\"",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
