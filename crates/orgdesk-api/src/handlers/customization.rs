//! The caller's organization UI customization

use axum::{extract::State, Json};
use orgdesk_layout::{CustomizationUpdate, OrganizationUiCustomization};

use crate::{actor::Actor, error::ApiResult, state::AppState};

pub async fn get_customization(
    State(state): State<AppState>,
    Actor(ctx): Actor,
) -> ApiResult<Json<OrganizationUiCustomization>> {
    let org = ctx.organization_id.clone();
    Ok(Json(state.layout.get_customization(&ctx, &org).await?))
}

pub async fn save_customization(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(update): Json<CustomizationUpdate>,
) -> ApiResult<Json<OrganizationUiCustomization>> {
    let org = ctx.organization_id.clone();
    Ok(Json(
        state.layout.save_customization(&ctx, &org, update).await?,
    ))
}

pub async fn reset_customization(
    State(state): State<AppState>,
    Actor(ctx): Actor,
) -> ApiResult<Json<OrganizationUiCustomization>> {
    let org = ctx.organization_id.clone();
    Ok(Json(state.layout.reset_customization(&ctx, &org).await?))
}
