//! File-backed permission store
//!
//! Keeps the tables in memory and rewrites a pretty-printed JSON snapshot after
//! every committed write. A failed write leaves both the file and the in-memory
//! state unchanged.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::audit::PermissionAuditEntry;
use crate::directory::{Tool, UserProfile};
use crate::error::StoreResult;
use crate::permission::{PermissionTemplate, UserPermission};
use crate::request::ToolAccessRequest;

use super::{ChangeSet, PermissionStore, Tables};

/// JSON snapshot store
#[derive(Debug)]
pub struct FilePermissionStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FilePermissionStore {
    /// Open the snapshot at `path`, starting empty when it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Tables::default()
        };

        tracing::debug!(path = %path.display(), "Opened permission store");
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Open `permissions.json` inside `data_dir`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> StoreResult<Self> {
        Self::open(data_dir.as_ref().join("permissions.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tables: &Tables) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tables)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn write_with(&self, update: impl FnOnce(&mut Tables)) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let mut next = tables.clone();
        update(&mut next);
        self.persist(&next)?;
        *tables = next;
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for FilePermissionStore {
    async fn apply(&self, changes: ChangeSet) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.validate(&changes)?;

        let mut next = tables.clone();
        next.commit(changes);
        self.persist(&next)?;
        *tables = next;
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
        self.write_with(|tables| tables.upsert_profile(profile))
    }

    async fn get_tool(&self, tool_id: &str) -> StoreResult<Option<Tool>> {
        Ok(self.tables.read().get_tool(tool_id))
    }

    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        Ok(self.tables.read().tools.clone())
    }

    async fn upsert_tool(&self, tool: Tool) -> StoreResult<()> {
        self.write_with(|tables| tables.upsert_tool(tool))
    }
}
