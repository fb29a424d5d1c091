//! Submitting, cancelling and listing access requests

use chrono::Utc;

use crate::audit::{AuditActionType, PermissionAuditEntry};
use crate::context::ActorContext;
use crate::error::{Error, Result};
use crate::request::{
    sort_queue, NewAccessRequest, QueueSummary, RequestFilter, RequestStatus, ToolAccessRequest,
};
use crate::storage::Mutation;

use super::{require_non_blank, snapshot, PermissionService};

impl PermissionService {
    /// Request access to a tool for the caller
    pub async fn submit_request(
        &self,
        ctx: &ActorContext,
        new: NewAccessRequest,
    ) -> Result<ToolAccessRequest> {
        self.validate_new_request(&new).await?;
        let now = Utc::now();

        if let Some(existing) = self.store.find_permission(&ctx.user_id, &new.tool_id).await? {
            if existing.is_active(now) {
                return Err(Error::Conflict(format!(
                    "user {} already has access to {}",
                    ctx.user_id, new.tool_id
                )));
            }
        }

        let request = ToolAccessRequest::pending(ctx.user_id.clone(), new, now);
        let entry = PermissionAuditEntry::new(&request.user_id, AuditActionType::Request, now)
            .with_tool(&request.tool_id)
            .with_after(Some(snapshot(&request)?))
            .performed_by_actor(ctx)
            .with_reason(request.request_reason.clone())
            .with_metadata("request_id", request.id.clone())
            .with_metadata("priority", request.priority.to_string());

        let changes = vec![
            Mutation::InsertRequest(request.clone()),
            Mutation::AppendAudit(entry),
        ];
        match self.commit(changes, Some(&ctx.organization_id)).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                return Err(Error::Conflict(format!(
                    "a pending request for {} already exists",
                    request.tool_id
                )));
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %ctx.user_id, "Failed to store access request");
                return Err(e.into());
            }
        }

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            tool_id = %request.tool_id,
            priority = %request.priority,
            "Access request submitted"
        );
        Ok(request)
    }

    async fn validate_new_request(&self, new: &NewAccessRequest) -> Result<()> {
        require_non_blank("tool_id", &new.tool_id)?;
        require_non_blank("request_reason", &new.request_reason)?;
        require_non_blank("business_justification", &new.business_justification)?;

        match (new.is_temporary, new.requested_duration_days) {
            (true, Some(days)) if (1..=self.settings.max_duration_days).contains(&days) => {}
            (true, _) => {
                return Err(Error::Validation(format!(
                    "temporary requests need a duration between 1 and {} days",
                    self.settings.max_duration_days
                )));
            }
            (false, Some(_)) => {
                return Err(Error::Validation(
                    "permanent requests must not carry a duration".to_string(),
                ));
            }
            (false, None) => {}
        }

        if self.store.get_tool(&new.tool_id).await?.is_none() {
            return Err(Error::Validation(format!("unknown tool: {}", new.tool_id)));
        }
        Ok(())
    }

    /// Withdraw a pending request; allowed for the requester and admins
    pub async fn cancel_request(&self, ctx: &ActorContext, id: &str) -> Result<ToolAccessRequest> {
        let request = self
            .store
            .get_request(id)
            .await?
            .ok_or_else(|| Error::not_found("Access request", id))?;
        ctx.require_self_or_admin(&request.user_id)?;
        self.require_subject_in_scope(ctx, &request.user_id).await?;

        if !request.status.can_transition_to(RequestStatus::Cancelled) {
            return Err(Error::Conflict(format!(
                "request {} is already {}",
                id, request.status
            )));
        }

        let now = Utc::now();
        let cancelled = request.transitioned(RequestStatus::Cancelled, Some(&ctx.user_id), None, now);
        let entry = PermissionAuditEntry::new(&request.user_id, AuditActionType::Request, now)
            .with_tool(&request.tool_id)
            .with_before(Some(snapshot(&request)?))
            .with_after(Some(snapshot(&cancelled)?))
            .performed_by_actor(ctx)
            .with_metadata("request_id", request.id.clone())
            .with_metadata("transition", "cancelled");

        let changes = vec![
            Mutation::UpdateRequest {
                request: cancelled.clone(),
                expected_status: RequestStatus::Pending,
            },
            Mutation::AppendAudit(entry),
        ];
        let org = self.organization_of(&request.user_id).await?;
        self.commit(changes, org.as_deref()).await.map_err(|e| {
            if e.is_conflict() {
                Error::Conflict(format!("request {} changed concurrently", id))
            } else {
                e.into()
            }
        })?;

        tracing::info!(request_id = %id, cancelled_by = %ctx.user_id, "Access request cancelled");
        Ok(cancelled)
    }

    /// Review queue, urgent first then oldest first
    ///
    /// Non-admins only see their own requests.
    pub async fn list_requests(
        &self,
        ctx: &ActorContext,
        filter: RequestFilter,
    ) -> Result<Vec<ToolAccessRequest>> {
        let mut filter = filter;
        if !ctx.is_admin() {
            match filter.user_id.as_deref() {
                Some(user_id) if user_id != ctx.user_id => {
                    return Err(Error::Unauthorized(
                        "only admins may list other users' requests".to_string(),
                    ));
                }
                _ => filter.user_id = Some(ctx.user_id.clone()),
            }
        }

        let visible = self.visible_users(ctx).await?;
        let mut requests: Vec<_> = self
            .store
            .list_requests()
            .await?
            .into_iter()
            .filter(|request| filter.matches(request))
            .filter(|request| {
                request.user_id == ctx.user_id
                    || visible.as_ref().map_or(true, |users| users.contains(&request.user_id))
            })
            .collect();

        sort_queue(&mut requests);
        Ok(requests)
    }

    /// Pending counts per priority for the caller's organization
    pub async fn queue_summary(&self, ctx: &ActorContext) -> Result<QueueSummary> {
        ctx.require_admin()?;
        let pending = self
            .list_requests(ctx, RequestFilter::new().with_status(RequestStatus::Pending))
            .await?;
        Ok(QueueSummary::from_requests(&pending))
    }
}
