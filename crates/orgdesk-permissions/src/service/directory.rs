use crate::directory::{Tool, UserProfile};
use crate::error::Result;

use super::PermissionService;

impl PermissionService {
    pub async fn upsert_profile(&self, profile: UserProfile) -> Result<()> {
        tracing::debug!(user_id = %profile.id, "Upserting profile");
        Ok(self.store.upsert_profile(profile).await?)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.store.get_profile(user_id).await?)
    }

    pub async fn upsert_tool(&self, tool: Tool) -> Result<()> {
        tracing::debug!(tool_id = %tool.id, "Upserting tool");
        Ok(self.store.upsert_tool(tool).await?)
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.store.list_tools().await?)
    }
}
