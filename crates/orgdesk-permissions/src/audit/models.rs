//! Audit trail data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::ActorContext;

/// Kind of event recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditActionType {
    Grant,
    Revoke,
    Request,
    Approve,
    Deny,
    Expire,
    CheckDenied,
    CheckAllowed,
}

impl AuditActionType {
    /// Actions shown by the "denials only" filter
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            AuditActionType::CheckDenied | AuditActionType::Deny | AuditActionType::Revoke
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditActionType::Grant => "grant",
            AuditActionType::Revoke => "revoke",
            AuditActionType::Request => "request",
            AuditActionType::Approve => "approve",
            AuditActionType::Deny => "deny",
            AuditActionType::Expire => "expire",
            AuditActionType::CheckDenied => "check_denied",
            AuditActionType::CheckAllowed => "check_allowed",
        }
    }
}

impl std::fmt::Display for AuditActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record of a permission event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionAuditEntry {
    pub id: String,
    /// Subject of the event
    pub user_id: String,
    #[serde(default)]
    pub tool_id: Option<String>,
    pub action_type: AuditActionType,
    #[serde(default)]
    pub permission_before: Option<Value>,
    #[serde(default)]
    pub permission_after: Option<Value>,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

impl PermissionAuditEntry {
    /// Create a new audit entry about `user_id`
    pub fn new(user_id: impl Into<String>, action_type: AuditActionType, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            tool_id: None,
            action_type,
            permission_before: None,
            permission_after: None,
            performed_by: None,
            reason: None,
            metadata: empty_metadata(),
            ip_address: None,
            user_agent: None,
            created_at,
        }
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }

    /// Snapshot of the state before the change; `None` records null
    pub fn with_before(mut self, snapshot: Option<Value>) -> Self {
        self.permission_before = snapshot;
        self
    }

    /// Snapshot of the state after the change
    pub fn with_after(mut self, snapshot: Option<Value>) -> Self {
        self.permission_after = snapshot;
        self
    }

    /// Record the actor and their client metadata
    pub fn performed_by_actor(mut self, ctx: &ActorContext) -> Self {
        self.performed_by = Some(ctx.user_id.clone());
        self.ip_address = ctx.ip_address.clone();
        self.user_agent = ctx.user_agent.clone();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set one metadata key
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.metadata {
            map.insert(key.to_string(), value.into());
        } else {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), value.into());
            self.metadata = Value::Object(map);
        }
        self
    }
}
