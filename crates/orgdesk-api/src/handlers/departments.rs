//! Department sections: stat cards, features and tools

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use orgdesk_layout::{ItemUpdate, NewItem, SectionItem, SectionKind};

use crate::{actor::Actor, error::ApiResult, models::ReorderRequest, state::AppState};

pub async fn list_section(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path((department_id, section)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SectionItem>>> {
    let kind: SectionKind = section.parse()?;
    Ok(Json(
        state.layout.list_section(&ctx, &department_id, kind).await?,
    ))
}

pub async fn create_item(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path((department_id, section)): Path<(String, String)>,
    Json(new): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<SectionItem>)> {
    let kind: SectionKind = section.parse()?;
    let item = state
        .layout
        .create_item(&ctx, &department_id, kind, new)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Section and department in the path only route the call; the id decides
pub async fn update_item(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path((_department_id, _section, item_id)): Path<(String, String, String)>,
    Json(update): Json<ItemUpdate>,
) -> ApiResult<Json<SectionItem>> {
    Ok(Json(state.layout.update_item(&ctx, &item_id, update).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path((_department_id, _section, item_id)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    state.layout.delete_item(&ctx, &item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the stored order after the move
pub async fn reorder_section(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path((department_id, section)): Path<(String, String)>,
    Json(body): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<SectionItem>>> {
    let kind: SectionKind = section.parse()?;
    let items = state
        .layout
        .reorder_section(&ctx, &department_id, kind, &body.moved_id, &body.target_id)
        .await?;
    Ok(Json(items))
}
