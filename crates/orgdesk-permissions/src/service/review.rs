//! Approving and denying access requests

use chrono::Utc;

use crate::audit::{AuditActionType, PermissionAuditEntry};
use crate::context::ActorContext;
use crate::error::{Error, Result, StoreError};
use crate::permission::UserPermission;
use crate::request::{
    grant_expiry, validate_comment, BulkReviewSummary, RequestStatus, ReviewCommand,
    ReviewDecision, ReviewOutcome,
};
use crate::storage::Mutation;

use super::{snapshot, PermissionService};

impl PermissionService {
    /// Approve or deny a pending request
    ///
    /// Business-rule violations come back as an unsuccessful outcome with
    /// nothing written. Only storage failures are errors.
    pub async fn review(
        &self,
        ctx: &ActorContext,
        request_id: &str,
        command: &ReviewCommand,
    ) -> Result<ReviewOutcome> {
        if let Err(e) = self.validate_review(ctx, command) {
            return Ok(ReviewOutcome::rejected(e.to_string()));
        }
        self.review_validated(ctx, request_id, command).await
    }

    /// Review several requests with one decision and comment
    ///
    /// Authorization and the comment are checked once; if they fail every id
    /// counts as failed. Each id is otherwise reviewed independently.
    pub async fn bulk_review(
        &self,
        ctx: &ActorContext,
        request_ids: &[String],
        command: &ReviewCommand,
    ) -> BulkReviewSummary {
        let mut summary = BulkReviewSummary::new(command.decision);

        if let Err(e) = self.validate_review(ctx, command) {
            tracing::warn!(error = %e, count = request_ids.len(), "Bulk review rejected");
            summary.failed = request_ids.len();
            return summary;
        }

        for request_id in request_ids {
            match self.review_validated(ctx, request_id, command).await {
                Ok(outcome) if outcome.success => summary.succeeded += 1,
                Ok(_) => summary.failed += 1,
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "Bulk review item failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            decision = %command.decision,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk review finished"
        );
        summary
    }

    fn validate_review(&self, ctx: &ActorContext, command: &ReviewCommand) -> Result<()> {
        ctx.require_admin()?;
        validate_comment(&command.comment, self.settings.min_comment_chars)?;
        if let Some(days) = command.grant_duration_days {
            if days == 0 || days > self.settings.max_duration_days {
                return Err(Error::Validation(format!(
                    "grant duration must be between 1 and {} days",
                    self.settings.max_duration_days
                )));
            }
        }
        Ok(())
    }

    async fn review_validated(
        &self,
        ctx: &ActorContext,
        request_id: &str,
        command: &ReviewCommand,
    ) -> Result<ReviewOutcome> {
        let Some(request) = self.store.get_request(request_id).await? else {
            return Ok(ReviewOutcome::rejected(
                Error::not_found("Access request", request_id).to_string(),
            ));
        };

        let organization = self.organization_of(&request.user_id).await?;
        if let Some(org) = organization.as_deref() {
            if let Err(e) = ctx.require_organization(org) {
                return Ok(ReviewOutcome::rejected(e.to_string()));
            }
        }

        if !request.status.is_pending() {
            return Ok(ReviewOutcome::rejected(format!(
                "request {} is already {}",
                request_id, request.status
            )));
        }

        let now = Utc::now();
        let comment = command.comment.trim();
        let mut reviewed =
            request.transitioned(command.decision.status(), Some(&ctx.user_id), Some(comment), now);

        let changes = match command.decision {
            ReviewDecision::Approved => {
                let expires_at = match grant_expiry(&request, command.grant_duration_days, now) {
                    Ok(expires_at) => expires_at,
                    Err(e) => return Ok(ReviewOutcome::rejected(e.to_string())),
                };
                reviewed.expires_at = expires_at;

                let before = self
                    .store
                    .find_permission(&request.user_id, &request.tool_id)
                    .await?;
                let mut permission = UserPermission::granted(
                    request.user_id.clone(),
                    request.tool_id.clone(),
                    ctx.user_id.clone(),
                    now,
                )
                .expiring_at(expires_at)
                .with_reason(request.request_reason.clone());
                permission.is_temporary = request.is_temporary;

                let entry = PermissionAuditEntry::new(&request.user_id, AuditActionType::Approve, now)
                    .with_tool(&request.tool_id)
                    .with_before(before.as_ref().map(snapshot).transpose()?)
                    .with_after(Some(snapshot(&permission)?))
                    .performed_by_actor(ctx)
                    .with_reason(comment)
                    .with_metadata("request_id", request.id.clone());

                vec![
                    Mutation::UpdateRequest {
                        request: reviewed,
                        expected_status: RequestStatus::Pending,
                    },
                    Mutation::UpsertPermission(permission),
                    Mutation::AppendAudit(entry),
                ]
            }
            ReviewDecision::Denied => {
                let entry = PermissionAuditEntry::new(&request.user_id, AuditActionType::Deny, now)
                    .with_tool(&request.tool_id)
                    .with_before(Some(snapshot(&request)?))
                    .with_after(Some(snapshot(&reviewed)?))
                    .performed_by_actor(ctx)
                    .with_reason(comment)
                    .with_metadata("request_id", request.id.clone());

                vec![
                    Mutation::UpdateRequest {
                        request: reviewed,
                        expected_status: RequestStatus::Pending,
                    },
                    Mutation::AppendAudit(entry),
                ]
            }
        };

        match self.commit(changes, organization.as_deref()).await {
            Ok(()) => {
                tracing::info!(
                    request_id = %request_id,
                    decision = %command.decision,
                    reviewed_by = %ctx.user_id,
                    "Access request reviewed"
                );
                Ok(ReviewOutcome::ok())
            }
            Err(e) if e.is_conflict() || matches!(e, StoreError::NotFound { .. }) => {
                tracing::warn!(request_id = %request_id, error = %e, "Review lost a race");
                Ok(ReviewOutcome::rejected(format!(
                    "request {} was already reviewed",
                    request_id
                )))
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to commit review");
                Err(e.into())
            }
        }
    }
}
