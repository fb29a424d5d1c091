//! Caller identity extracted from gateway headers

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use orgdesk_permissions::ActorContext;

use crate::{error::ApiError, state::AppState};

/// Header carrying the authenticated user id, set by the auth gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request
///
/// Organization and permission level come from the caller's directory
/// profile, never from the request itself.
#[derive(Debug, Clone)]
pub struct Actor(pub ActorContext);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = header(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Authentication(format!("missing {} header", USER_ID_HEADER)))?;

        let profile = state
            .permissions
            .get_profile(&user_id)
            .await?
            .ok_or_else(|| ApiError::Authentication(format!("unknown user {}", user_id)))?;

        let mut ctx = ActorContext::from_profile(&profile);
        if let Some(ip) = header(&parts.headers, "x-forwarded-for")
            .and_then(|value| value.split(',').next().map(|first| first.trim().to_string()))
            .filter(|ip| !ip.is_empty())
        {
            ctx = ctx.with_ip(ip);
        }
        if let Some(user_agent) = header(&parts.headers, "user-agent") {
            ctx = ctx.with_user_agent(user_agent);
        }
        Ok(Actor(ctx))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
