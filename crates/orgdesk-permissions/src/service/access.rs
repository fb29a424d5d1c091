//! Tool-access checks

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditActionType, PermissionAuditEntry};
use crate::context::ActorContext;
use crate::error::{Error, Result};
use crate::permission::PermissionCheckResult;
use crate::storage::Mutation;

use super::PermissionService;

/// Whether a check records an audit entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLogging {
    None,
    /// Append `check_allowed` / `check_denied`; failures are logged and ignored
    #[default]
    BestEffort,
}

impl PermissionService {
    /// Decide whether `user_id` may use `tool_id`
    ///
    /// Non-admins may only check themselves.
    pub async fn check_access(
        &self,
        ctx: &ActorContext,
        user_id: &str,
        tool_id: &str,
        logging: CheckLogging,
    ) -> Result<PermissionCheckResult> {
        if ctx.user_id != user_id && !ctx.is_admin() {
            return Err(Error::Unauthorized(
                "only admins may check access for other users".to_string(),
            ));
        }

        let profile = self.store.get_profile(user_id).await?;
        if let Some(profile) = &profile {
            ctx.require_organization(&profile.organization_id)?;
        }
        let explicit = self.store.find_permission(user_id, tool_id).await?;
        let templates = self.store.list_templates().await?;

        let now = Utc::now();
        let result = self
            .checker
            .resolve(profile.as_ref(), explicit.as_ref(), &templates, tool_id, now);

        tracing::debug!(
            user_id = %user_id,
            tool_id = %tool_id,
            allowed = result.allowed,
            source = %result.source,
            "Access check"
        );

        if logging == CheckLogging::BestEffort && self.settings.log_access_checks {
            let action = if result.allowed {
                AuditActionType::CheckAllowed
            } else {
                AuditActionType::CheckDenied
            };
            let mut entry = PermissionAuditEntry::new(user_id, action, now)
                .with_tool(tool_id)
                .performed_by_actor(ctx)
                .with_metadata("source", result.source.to_string())
                .with_metadata("permission_level", result.permission_level.to_string());
            entry.reason = result.reason.clone();

            let org = profile.as_ref().map(|p| p.organization_id.as_str());
            if let Err(e) = self.commit(vec![Mutation::AppendAudit(entry)], org).await {
                tracing::warn!(
                    user_id = %user_id,
                    tool_id = %tool_id,
                    error = %e,
                    "Failed to record access check"
                );
            }
        }

        Ok(result)
    }
}
