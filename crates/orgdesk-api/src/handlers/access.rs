//! Access checks, direct grants, revocation and the expiry sweep

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use orgdesk_permissions::{
    BulkGrant, BulkGrantSummary, CheckLogging, PermissionCheckResult, SweepReport,
    UserPermission,
};

use crate::{
    actor::Actor,
    error::ApiResult,
    models::{CheckQuery, RevokeRequest},
    state::AppState,
};

pub async fn check_access(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Json<PermissionCheckResult>> {
    let user_id = query.user_id.unwrap_or_else(|| ctx.user_id.clone());
    let result = state
        .permissions
        .check_access(&ctx, &user_id, &query.tool_id, CheckLogging::BestEffort)
        .await?;
    Ok(Json(result))
}

pub async fn list_user_permissions(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<UserPermission>>> {
    Ok(Json(
        state.permissions.list_user_permissions(&ctx, &user_id).await?,
    ))
}

pub async fn grant_permissions(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(grant): Json<BulkGrant>,
) -> ApiResult<Json<BulkGrantSummary>> {
    Ok(Json(state.permissions.grant_permissions(&ctx, grant).await?))
}

pub async fn revoke_permission(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(body): Json<RevokeRequest>,
) -> ApiResult<Json<UserPermission>> {
    let revoked = state
        .permissions
        .revoke_permission(&ctx, &body.user_id, &body.tool_id, &body.reason)
        .await?;
    Ok(Json(revoked))
}

pub async fn sweep_expired(
    State(state): State<AppState>,
    Actor(ctx): Actor,
) -> ApiResult<Json<SweepReport>> {
    Ok(Json(state.permissions.sweep_expired(&ctx, Utc::now()).await?))
}
