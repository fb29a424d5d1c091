//! In-memory permission store

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::audit::PermissionAuditEntry;
use crate::directory::{Tool, UserProfile};
use crate::error::StoreResult;
use crate::permission::{PermissionTemplate, UserPermission};
use crate::request::ToolAccessRequest;

use super::{ChangeSet, PermissionStore, Tables};

/// Thread-safe in-memory implementation of [`PermissionStore`]
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    tables: RwLock<Tables>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing tables (useful for testing)
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Tables {
        self.tables.read().clone()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn apply(&self, changes: ChangeSet) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.validate(&changes)?;
        tables.commit(changes);
        Ok(())
    }

    async fn get_request(&self, id: &str) -> StoreResult<Option<ToolAccessRequest>> {
        Ok(self.tables.read().get_request(id))
    }

    async fn list_requests(&self) -> StoreResult<Vec<ToolAccessRequest>> {
        Ok(self.tables.read().requests.clone())
    }

    async fn find_permission(
        &self,
        user_id: &str,
        tool_id: &str,
    ) -> StoreResult<Option<UserPermission>> {
        Ok(self.tables.read().find_permission(user_id, tool_id))
    }

    async fn list_permissions(&self, user_id: Option<&str>) -> StoreResult<Vec<UserPermission>> {
        Ok(self.tables.read().list_permissions(user_id))
    }

    async fn list_templates(&self) -> StoreResult<Vec<PermissionTemplate>> {
        Ok(self.tables.read().templates.clone())
    }

    async fn get_template(&self, id: &str) -> StoreResult<Option<PermissionTemplate>> {
        Ok(self.tables.read().get_template(id))
    }

    async fn audit_entries(&self) -> StoreResult<Vec<PermissionAuditEntry>> {
        Ok(self.tables.read().audit.clone())
    }

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.read().get_profile(user_id))
    }

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        Ok(self.tables.read().profiles.clone())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> StoreResult<()> {
        self.tables.write().upsert_profile(profile);
        Ok(())
    }

    async fn get_tool(&self, tool_id: &str) -> StoreResult<Option<Tool>> {
        Ok(self.tables.read().get_tool(tool_id))
    }

    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        Ok(self.tables.read().tools.clone())
    }

    async fn upsert_tool(&self, tool: Tool) -> StoreResult<()> {
        self.tables.write().upsert_tool(tool);
        Ok(())
    }
}
