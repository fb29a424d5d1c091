//! Access-request submission and review

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use orgdesk_permissions::{
    BulkReviewSummary, NewAccessRequest, QueueSummary, RequestFilter, ReviewCommand,
    ReviewOutcome, ToolAccessRequest,
};

use crate::{actor::Actor, error::ApiResult, models::BulkReviewRequest, state::AppState};

pub async fn submit_request(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(new): Json<NewAccessRequest>,
) -> ApiResult<(StatusCode, Json<ToolAccessRequest>)> {
    let request = state.permissions.submit_request(&ctx, new).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Query(filter): Query<RequestFilter>,
) -> ApiResult<Json<Vec<ToolAccessRequest>>> {
    Ok(Json(state.permissions.list_requests(&ctx, filter).await?))
}

pub async fn queue_summary(
    State(state): State<AppState>,
    Actor(ctx): Actor,
) -> ApiResult<Json<QueueSummary>> {
    Ok(Json(state.permissions.queue_summary(&ctx).await?))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<ToolAccessRequest>> {
    Ok(Json(state.permissions.cancel_request(&ctx, &id).await?))
}

/// Business rejections come back as `200` with `success = false`
pub async fn review_request(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<String>,
    Json(command): Json<ReviewCommand>,
) -> ApiResult<Json<ReviewOutcome>> {
    Ok(Json(state.permissions.review(&ctx, &id, &command).await?))
}

pub async fn bulk_review(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(body): Json<BulkReviewRequest>,
) -> Json<BulkReviewSummary> {
    Json(
        state
            .permissions
            .bulk_review(&ctx, &body.request_ids, &body.command)
            .await,
    )
}
