//! Persistence for permissions, requests, templates, audit entries and the
//! user directory.
//!
//! Writes go through [`PermissionStore::apply`] as a [`ChangeSet`]: every
//! precondition in the set is checked before anything is mutated, so a set
//! either commits whole or leaves the store untouched.

mod file;
mod memory;
mod tables;

pub use file::FilePermissionStore;
pub use memory::InMemoryPermissionStore;
pub use tables::Tables;

use async_trait::async_trait;
use orgdesk_events::{ChangeEvent, ChangeKind, Table};

use crate::audit::PermissionAuditEntry;
use crate::directory::{Tool, UserProfile};
use crate::error::StoreResult;
use crate::permission::{PermissionTemplate, UserPermission};
use crate::request::{RequestStatus, ToolAccessRequest};

/// One write inside a change set
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new request; a pending request must not collide with another
    /// pending request for the same user and tool
    InsertRequest(ToolAccessRequest),
    /// Replace a request, provided its stored status is still `expected_status`
    UpdateRequest {
        request: ToolAccessRequest,
        expected_status: RequestStatus,
    },
    /// Insert or replace the row for `(user_id, tool_id)`
    UpsertPermission(UserPermission),
    /// Replace the row for `(user_id, tool_id)`, provided it still equals
    /// `expected`
    UpdatePermission {
        permission: UserPermission,
        expected: UserPermission,
    },
    AppendAudit(PermissionAuditEntry),
    UpsertTemplate(PermissionTemplate),
    DeleteTemplate(String),
}

impl Mutation {
    /// Notification published once the mutation is committed
    ///
    /// Upserts report `update`.
    pub fn change_event(&self) -> ChangeEvent {
        match self {
            Mutation::InsertRequest(request) => {
                ChangeEvent::new(Table::ToolAccessRequests, ChangeKind::Insert, &request.id)
                    .for_user(&request.user_id)
            }
            Mutation::UpdateRequest { request, .. } => {
                ChangeEvent::new(Table::ToolAccessRequests, ChangeKind::Update, &request.id)
                    .for_user(&request.user_id)
            }
            Mutation::UpsertPermission(permission)
            | Mutation::UpdatePermission { permission, .. } => ChangeEvent::new(
                Table::UserPermissions,
                ChangeKind::Update,
                format!("{}:{}", permission.user_id, permission.tool_id),
            )
            .for_user(&permission.user_id),
            Mutation::AppendAudit(entry) => {
                ChangeEvent::new(Table::PermissionAuditTrail, ChangeKind::Insert, &entry.id)
                    .for_user(&entry.user_id)
            }
            Mutation::UpsertTemplate(template) => {
                ChangeEvent::new(Table::PermissionTemplates, ChangeKind::Update, &template.id)
            }
            Mutation::DeleteTemplate(id) => {
                ChangeEvent::new(Table::PermissionTemplates, ChangeKind::Delete, id)
            }
        }
    }
}

/// Writes committed together
pub type ChangeSet = Vec<Mutation>;

/// Storage backend for the permission services
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Validate and commit a change set atomically
    async fn apply(&self, changes: ChangeSet) -> StoreResult<()>;

    async fn get_request(&self, id: &str) -> StoreResult<Option<ToolAccessRequest>>;

    /// Every request, in insertion order
    async fn list_requests(&self) -> StoreResult<Vec<ToolAccessRequest>>;

    async fn find_permission(
        &self,
        user_id: &str,
        tool_id: &str,
    ) -> StoreResult<Option<UserPermission>>;

    /// Permission rows, optionally restricted to one user
    async fn list_permissions(&self, user_id: Option<&str>) -> StoreResult<Vec<UserPermission>>;

    async fn list_templates(&self) -> StoreResult<Vec<PermissionTemplate>>;

    async fn get_template(&self, id: &str) -> StoreResult<Option<PermissionTemplate>>;

    /// The audit trail in append order
    async fn audit_entries(&self) -> StoreResult<Vec<PermissionAuditEntry>>;

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>>;

    async fn upsert_profile(&self, profile: UserProfile) -> StoreResult<()>;

    async fn get_tool(&self, tool_id: &str) -> StoreResult<Option<Tool>>;

    async fn list_tools(&self) -> StoreResult<Vec<Tool>>;

    async fn upsert_tool(&self, tool: Tool) -> StoreResult<()>;
}
