//! Change event types
//!
//! A change event names the table and row that changed. Subscribers never rely
//! on a payload: any event means "invalidate and refetch".

use serde::{Deserialize, Serialize};

/// Tables that emit change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// `ai_user_permissions`
    UserPermissions,
    /// `ai_tool_access_requests`
    ToolAccessRequests,
    /// `ai_permission_audit_trail`
    PermissionAuditTrail,
    /// `ai_permission_templates`
    PermissionTemplates,
    /// `department_stat_cards`
    DepartmentStatCards,
    /// `department_features`
    DepartmentFeatures,
    /// `department_tools`
    DepartmentTools,
    /// `organization_ui_customizations`
    OrganizationUiCustomizations,
}

impl Table {
    /// Name of the backing table
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::UserPermissions => "ai_user_permissions",
            Table::ToolAccessRequests => "ai_tool_access_requests",
            Table::PermissionAuditTrail => "ai_permission_audit_trail",
            Table::PermissionTemplates => "ai_permission_templates",
            Table::DepartmentStatCards => "department_stat_cards",
            Table::DepartmentFeatures => "department_features",
            Table::DepartmentTools => "department_tools",
            Table::OrganizationUiCustomizations => "organization_ui_customizations",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of row-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Row was inserted
    Insert,
    /// Row was updated
    Update,
    /// Row was deleted
    Delete,
}

/// A committed row-level change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table the row belongs to
    pub table: Table,
    /// Kind of change
    pub kind: ChangeKind,
    /// Owning organization, when the row is organization scoped
    pub organization_id: Option<String>,
    /// Subject user, when the row is user scoped
    pub user_id: Option<String>,
    /// Identifier of the changed row
    pub row_id: String,
}

impl ChangeEvent {
    /// Create a new change event for a row
    pub fn new(table: Table, kind: ChangeKind, row_id: impl Into<String>) -> Self {
        Self {
            table,
            kind,
            organization_id: None,
            user_id: None,
            row_id: row_id.into(),
        }
    }

    /// Scope the event to an organization
    pub fn for_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Scope the event to a user
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Whether a subscriber keyed by organization and/or user should refetch
    ///
    /// Unscoped events concern everyone. A `None` key on the subscriber side
    /// matches any value.
    pub fn concerns(&self, organization_id: Option<&str>, user_id: Option<&str>) -> bool {
        let org_matches = match (&self.organization_id, organization_id) {
            (Some(event_org), Some(org)) => event_org == org,
            _ => true,
        };
        let user_matches = match (&self.user_id, user_id) {
            (Some(event_user), Some(user)) => event_user == user,
            _ => true,
        };
        org_matches && user_matches
    }
}
