//! Permission template management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use orgdesk_permissions::{NewTemplate, PermissionTemplate, TemplateUpdate};

use crate::{actor::Actor, error::ApiResult, state::AppState};

pub async fn list_templates(
    State(state): State<AppState>,
    Actor(_ctx): Actor,
) -> ApiResult<Json<Vec<PermissionTemplate>>> {
    Ok(Json(state.permissions.list_templates().await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    Actor(_ctx): Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<PermissionTemplate>> {
    Ok(Json(state.permissions.get_template(&id).await?))
}

pub async fn create_template(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(new): Json<NewTemplate>,
) -> ApiResult<(StatusCode, Json<PermissionTemplate>)> {
    let template = state.permissions.create_template(&ctx, new).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<String>,
    Json(update): Json<TemplateUpdate>,
) -> ApiResult<Json<PermissionTemplate>> {
    Ok(Json(
        state.permissions.update_template(&ctx, &id, update).await?,
    ))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.permissions.delete_template(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
