//! Audit trail reads

use crate::audit::{export_csv, matching_entries, AuditFilter, AuditPage, PermissionAuditEntry, Pagination};
use crate::context::ActorContext;
use crate::error::Result;

use super::PermissionService;

impl PermissionService {
    /// Default pagination from settings
    pub fn default_pagination(&self) -> Pagination {
        Pagination::first_page(self.settings.default_page_size)
    }

    /// One page of the caller's organization's audit trail, newest first
    pub async fn fetch_audit_trail(
        &self,
        ctx: &ActorContext,
        filter: &AuditFilter,
        pagination: Pagination,
    ) -> Result<AuditPage> {
        ctx.require_admin()?;
        let entries = self.scoped_audit_entries(ctx).await?;
        let pagination = pagination.normalized(self.settings.max_page_size);
        Ok(AuditPage::execute(&entries, filter, pagination))
    }

    /// Every entry matching `filter`, rendered as CSV
    pub async fn export_audit_csv(&self, ctx: &ActorContext, filter: &AuditFilter) -> Result<String> {
        ctx.require_admin()?;
        let entries = matching_entries(&self.scoped_audit_entries(ctx).await?, filter);
        let profiles = self.store.list_profiles().await?;
        let tools = self.store.list_tools().await?;

        tracing::info!(rows = entries.len(), exported_by = %ctx.user_id, "Exporting audit trail");
        export_csv(&entries, &profiles, &tools)
    }

    async fn scoped_audit_entries(&self, ctx: &ActorContext) -> Result<Vec<PermissionAuditEntry>> {
        let entries = self.store.audit_entries().await?;
        Ok(match self.visible_users(ctx).await? {
            None => entries,
            Some(users) => entries
                .into_iter()
                .filter(|entry| users.contains(&entry.user_id))
                .collect(),
        })
    }
}
