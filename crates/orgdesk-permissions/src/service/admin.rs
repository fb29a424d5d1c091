//! Direct grants, revocation and the expiry sweep

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditActionType, PermissionAuditEntry};
use crate::context::ActorContext;
use crate::error::{Error, Result};
use crate::permission::UserPermission;
use crate::request::RequestStatus;
use crate::storage::Mutation;

use super::{require_non_blank, snapshot, PermissionService};

/// Grant every listed tool to every listed user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGrant {
    pub user_ids: Vec<String>,
    pub tool_ids: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGrantSummary {
    pub granted: usize,
    pub failed: usize,
}

/// What one sweep changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub expired_permissions: usize,
    pub expired_requests: usize,
}

impl PermissionService {
    /// Grant each user × tool pair; each pair commits on its own
    pub async fn grant_permissions(
        &self,
        ctx: &ActorContext,
        grant: BulkGrant,
    ) -> Result<BulkGrantSummary> {
        ctx.require_admin()?;
        if grant.user_ids.is_empty() || grant.tool_ids.is_empty() {
            return Err(Error::Validation(
                "at least one user and one tool are required".to_string(),
            ));
        }
        if grant.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(Error::Validation("expires_at must be in the future".to_string()));
        }

        let mut summary = BulkGrantSummary::default();
        for user_id in &grant.user_ids {
            for tool_id in &grant.tool_ids {
                match self.grant_one(ctx, user_id, tool_id, &grant).await {
                    Ok(()) => summary.granted += 1,
                    Err(e) => {
                        tracing::warn!(user_id = %user_id, tool_id = %tool_id, error = %e, "Grant failed");
                        summary.failed += 1;
                    }
                }
            }
        }

        tracing::info!(granted = summary.granted, failed = summary.failed, granted_by = %ctx.user_id, "Bulk grant finished");
        Ok(summary)
    }

    async fn grant_one(
        &self,
        ctx: &ActorContext,
        user_id: &str,
        tool_id: &str,
        grant: &BulkGrant,
    ) -> Result<()> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id))?;
        ctx.require_organization(&profile.organization_id)?;
        if self.store.get_tool(tool_id).await?.is_none() {
            return Err(Error::not_found("Tool", tool_id));
        }

        let now = Utc::now();
        let before = self.store.find_permission(user_id, tool_id).await?;
        let mut permission =
            UserPermission::granted(user_id, tool_id, ctx.user_id.clone(), now).expiring_at(grant.expires_at);
        permission.reason = grant.reason.clone();

        let mut entry = PermissionAuditEntry::new(user_id, AuditActionType::Grant, now)
            .with_tool(tool_id)
            .with_before(before.as_ref().map(snapshot).transpose()?)
            .with_after(Some(snapshot(&permission)?))
            .performed_by_actor(ctx);
        entry.reason = grant.reason.clone();

        self.commit(
            vec![Mutation::UpsertPermission(permission), Mutation::AppendAudit(entry)],
            Some(&profile.organization_id),
        )
        .await?;
        Ok(())
    }

    /// Explicitly revoke a user's row for a tool
    ///
    /// Fails with a conflict when the row changes between the read and the
    /// commit.
    pub async fn revoke_permission(
        &self,
        ctx: &ActorContext,
        user_id: &str,
        tool_id: &str,
        reason: &str,
    ) -> Result<UserPermission> {
        ctx.require_admin()?;
        require_non_blank("reason", reason)?;
        self.require_subject_in_scope(ctx, user_id).await?;

        let before = self
            .store
            .find_permission(user_id, tool_id)
            .await?
            .ok_or_else(|| Error::not_found("Permission", format!("{}/{}", user_id, tool_id)))?;

        let now = Utc::now();
        let revoked = UserPermission {
            granted: false,
            reason: Some(reason.trim().to_string()),
            ..before.clone()
        };
        let entry = PermissionAuditEntry::new(user_id, AuditActionType::Revoke, now)
            .with_tool(tool_id)
            .with_before(Some(snapshot(&before)?))
            .with_after(Some(snapshot(&revoked)?))
            .performed_by_actor(ctx)
            .with_reason(reason.trim());

        let org = self.organization_of(user_id).await?;
        self.commit(
            vec![
                Mutation::UpdatePermission {
                    permission: revoked.clone(),
                    expected: before,
                },
                Mutation::AppendAudit(entry),
            ],
            org.as_deref(),
        )
        .await?;

        tracing::info!(user_id = %user_id, tool_id = %tool_id, revoked_by = %ctx.user_id, "Permission revoked");
        Ok(revoked)
    }

    /// Explicit rows for a user; self or admin
    pub async fn list_user_permissions(
        &self,
        ctx: &ActorContext,
        user_id: &str,
    ) -> Result<Vec<UserPermission>> {
        ctx.require_self_or_admin(user_id)?;
        self.require_subject_in_scope(ctx, user_id).await?;
        Ok(self.store.list_permissions(Some(user_id)).await?)
    }

    /// Expire lapsed grants and stale pending requests
    ///
    /// Every row changes in its own change set with an `expire` audit entry.
    /// Rows that changed concurrently are skipped.
    pub async fn sweep_expired(&self, ctx: &ActorContext, now: DateTime<Utc>) -> Result<SweepReport> {
        ctx.require_admin()?;
        let visible = self.visible_users(ctx).await?;
        let in_scope = |user_id: &str| visible.as_ref().map_or(true, |users| users.contains(user_id));
        let mut report = SweepReport::default();

        let lapsed: Vec<_> = self
            .store
            .list_permissions(None)
            .await?
            .into_iter()
            .filter(|p| p.granted && p.is_expired(now) && in_scope(&p.user_id))
            .collect();

        for permission in lapsed {
            let expired = UserPermission {
                granted: false,
                ..permission.clone()
            };
            let entry = PermissionAuditEntry::new(&permission.user_id, AuditActionType::Expire, now)
                .with_tool(&permission.tool_id)
                .with_before(Some(snapshot(&permission)?))
                .with_after(Some(snapshot(&expired)?))
                .performed_by_actor(ctx)
                .with_reason("permission expired");

            let org = self.organization_of(&permission.user_id).await?;
            let changes = vec![
                Mutation::UpdatePermission {
                    permission: expired,
                    expected: permission.clone(),
                },
                Mutation::AppendAudit(entry),
            ];
            match self.commit(changes, org.as_deref()).await {
                Ok(()) => report.expired_permissions += 1,
                Err(e) if e.is_conflict() => {
                    tracing::debug!(
                        user_id = %permission.user_id,
                        tool_id = %permission.tool_id,
                        "Permission changed during sweep"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        // no request can be older than the earliest representable instant
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(self.settings.pending_ttl_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let stale: Vec<_> = self
            .store
            .list_requests()
            .await?
            .into_iter()
            .filter(|r| r.status.is_pending() && r.created_at <= cutoff && in_scope(&r.user_id))
            .collect();

        for request in stale {
            let expired = request.transitioned(RequestStatus::Expired, None, None, now);
            let entry = PermissionAuditEntry::new(&request.user_id, AuditActionType::Expire, now)
                .with_tool(&request.tool_id)
                .with_before(Some(snapshot(&request)?))
                .with_after(Some(snapshot(&expired)?))
                .performed_by_actor(ctx)
                .with_reason("pending request expired")
                .with_metadata("request_id", request.id.clone())
                .with_metadata("transition", "expired");

            let org = self.organization_of(&request.user_id).await?;
            let changes = vec![
                Mutation::UpdateRequest {
                    request: expired,
                    expected_status: RequestStatus::Pending,
                },
                Mutation::AppendAudit(entry),
            ];
            match self.commit(changes, org.as_deref()).await {
                Ok(()) => report.expired_requests += 1,
                Err(e) if e.is_conflict() => {
                    tracing::debug!(request_id = %request.id, "Request changed during sweep");
                }
                Err(e) => return Err(e.into()),
            }
        }

        if report.expired_permissions > 0 || report.expired_requests > 0 {
            tracing::info!(
                expired_permissions = report.expired_permissions,
                expired_requests = report.expired_requests,
                "Expiry sweep finished"
            );
        }
        Ok(report)
    }
}
