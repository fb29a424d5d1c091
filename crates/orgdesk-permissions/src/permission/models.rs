//! Permission data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Coarse role tier, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Viewer,
    Employee,
    Manager,
    Admin,
    MasterAdmin,
}

impl PermissionLevel {
    /// Every level, least privileged first
    pub const ALL: [PermissionLevel; 5] = [
        PermissionLevel::Viewer,
        PermissionLevel::Employee,
        PermissionLevel::Manager,
        PermissionLevel::Admin,
        PermissionLevel::MasterAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Viewer => "viewer",
            PermissionLevel::Employee => "employee",
            PermissionLevel::Manager => "manager",
            PermissionLevel::Admin => "admin",
            PermissionLevel::MasterAdmin => "master_admin",
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| Error::InvalidPermissionLevel(s.to_string()))
    }
}

/// Explicit per-user grant or revocation for one tool
///
/// At most one row exists per `(user_id, tool_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    pub user_id: String,
    pub tool_id: String,
    pub granted: bool,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub is_temporary: bool,
}

impl UserPermission {
    /// Create a granted row
    pub fn granted(
        user_id: impl Into<String>,
        tool_id: impl Into<String>,
        granted_by: impl Into<String>,
        granted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tool_id: tool_id.into(),
            granted: true,
            granted_by: granted_by.into(),
            granted_at,
            expires_at: None,
            reason: None,
            is_temporary: false,
        }
    }

    /// Set an expiry; rows with an expiry are temporary
    pub fn expiring_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.is_temporary = expires_at.is_some();
        self.expires_at = expires_at;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether `expires_at` has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Granted and not expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.granted && !self.is_expired(now)
    }
}

/// Tool lists carried by a template
///
/// `all` supersedes both lists. Entries may be glob patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermissions {
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub denied_tools: Vec<String>,
}

impl ToolPermissions {
    /// Grants every tool
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Grants the listed tools
    pub fn allowing<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_tools: tools.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds denied entries
    pub fn denying<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.denied_tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Entries listed verbatim in both the allowed and denied lists
    pub fn overlapping_entries(&self) -> Vec<&str> {
        self.allowed_tools
            .iter()
            .filter(|tool| self.denied_tools.contains(tool))
            .map(String::as_str)
            .collect()
    }
}

/// Reusable mapping from a permission level to tool lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub permission_level: PermissionLevel,
    pub tool_permissions: ToolPermissions,
    #[serde(default)]
    pub is_system_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermissionTemplate {
    /// Create a custom (mutable) template
    pub fn new(
        name: impl Into<String>,
        permission_level: PermissionLevel,
        tool_permissions: ToolPermissions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            permission_level,
            tool_permissions,
            is_system_template: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
