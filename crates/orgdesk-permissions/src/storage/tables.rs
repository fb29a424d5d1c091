use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::audit::PermissionAuditEntry;
use crate::directory::{Tool, UserProfile};
use crate::error::{StoreError, StoreResult};
use crate::permission::{PermissionTemplate, UserPermission};
use crate::request::{RequestStatus, ToolAccessRequest};

use super::{ChangeSet, Mutation};

/// Complete image of the permission tables
///
/// This is also the on-disk snapshot format of the file store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub requests: Vec<ToolAccessRequest>,
    #[serde(default)]
    pub permissions: Vec<UserPermission>,
    #[serde(default)]
    pub templates: Vec<PermissionTemplate>,
    #[serde(default)]
    pub audit: Vec<PermissionAuditEntry>,
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Tables {
    /// Check every precondition of `changes` against the current state plus
    /// the effects of earlier mutations in the same set
    pub fn validate(&self, changes: &ChangeSet) -> StoreResult<()> {
        let mut requests: HashMap<&str, (&str, &str, RequestStatus)> = self
            .requests
            .iter()
            .map(|r| (r.id.as_str(), (r.user_id.as_str(), r.tool_id.as_str(), r.status)))
            .collect();
        let mut pending: HashSet<(&str, &str)> = self
            .requests
            .iter()
            .filter(|r| r.status.is_pending())
            .map(|r| (r.user_id.as_str(), r.tool_id.as_str()))
            .collect();
        let mut templates: HashSet<&str> = self.templates.iter().map(|t| t.id.as_str()).collect();
        let mut permissions: HashMap<(&str, &str), &UserPermission> = self
            .permissions
            .iter()
            .map(|p| ((p.user_id.as_str(), p.tool_id.as_str()), p))
            .collect();

        for mutation in changes {
            match mutation {
                Mutation::InsertRequest(request) => {
                    if requests.contains_key(request.id.as_str()) {
                        return Err(StoreError::DuplicateId(request.id.clone()));
                    }
                    let pair = (request.user_id.as_str(), request.tool_id.as_str());
                    if request.status.is_pending() && !pending.insert(pair) {
                        return Err(StoreError::DuplicatePending {
                            user_id: request.user_id.clone(),
                            tool_id: request.tool_id.clone(),
                        });
                    }
                    requests.insert(request.id.as_str(), (pair.0, pair.1, request.status));
                }
                Mutation::UpdateRequest {
                    request,
                    expected_status,
                } => {
                    let Some(&(user_id, tool_id, stored)) = requests.get(request.id.as_str())
                    else {
                        return Err(StoreError::not_found("Access request", &request.id));
                    };
                    if stored != *expected_status {
                        return Err(StoreError::ConcurrencyConflict(format!(
                            "request {} is {}, expected {}",
                            request.id, stored, expected_status
                        )));
                    }
                    if stored.is_pending() && !request.status.is_pending() {
                        pending.remove(&(user_id, tool_id));
                    }
                    requests.insert(request.id.as_str(), (user_id, tool_id, request.status));
                }
                Mutation::DeleteTemplate(id) => {
                    if !templates.remove(id.as_str()) {
                        return Err(StoreError::not_found("Permission template", id));
                    }
                }
                Mutation::UpsertTemplate(template) => {
                    templates.insert(template.id.as_str());
                }
                Mutation::UpsertPermission(permission) => {
                    permissions.insert(
                        (permission.user_id.as_str(), permission.tool_id.as_str()),
                        permission,
                    );
                }
                Mutation::UpdatePermission {
                    permission,
                    expected,
                } => {
                    let pair = (permission.user_id.as_str(), permission.tool_id.as_str());
                    let Some(stored) = permissions.get(&pair) else {
                        return Err(StoreError::not_found(
                            "Permission",
                            format!("{}/{}", pair.0, pair.1),
                        ));
                    };
                    if *stored != expected {
                        return Err(StoreError::ConcurrencyConflict(format!(
                            "permission {}/{} changed since it was read",
                            pair.0, pair.1
                        )));
                    }
                    permissions.insert(pair, permission);
                }
                Mutation::AppendAudit(_) => {}
            }
        }

        Ok(())
    }

    /// Apply a validated change set
    pub fn commit(&mut self, changes: ChangeSet) {
        for mutation in changes {
            match mutation {
                Mutation::InsertRequest(request) => self.requests.push(request),
                Mutation::UpdateRequest { request, .. } => {
                    if let Some(slot) = self.requests.iter_mut().find(|r| r.id == request.id) {
                        *slot = request;
                    }
                }
                Mutation::UpsertPermission(permission)
                | Mutation::UpdatePermission { permission, .. } => {
                    match self.permissions.iter_mut().find(|p| {
                        p.user_id == permission.user_id && p.tool_id == permission.tool_id
                    }) {
                        Some(slot) => *slot = permission,
                        None => self.permissions.push(permission),
                    }
                }
                Mutation::AppendAudit(entry) => self.audit.push(entry),
                Mutation::UpsertTemplate(template) => {
                    match self.templates.iter_mut().find(|t| t.id == template.id) {
                        Some(slot) => *slot = template,
                        None => self.templates.push(template),
                    }
                }
                Mutation::DeleteTemplate(id) => self.templates.retain(|t| t.id != id),
            }
        }
    }

    pub fn get_request(&self, id: &str) -> Option<ToolAccessRequest> {
        self.requests.iter().find(|r| r.id == id).cloned()
    }

    pub fn find_permission(&self, user_id: &str, tool_id: &str) -> Option<UserPermission> {
        self.permissions
            .iter()
            .find(|p| p.user_id == user_id && p.tool_id == tool_id)
            .cloned()
    }

    pub fn list_permissions(&self, user_id: Option<&str>) -> Vec<UserPermission> {
        self.permissions
            .iter()
            .filter(|p| user_id.map_or(true, |user_id| p.user_id == user_id))
            .cloned()
            .collect()
    }

    pub fn get_template(&self, id: &str) -> Option<PermissionTemplate> {
        self.templates.iter().find(|t| t.id == id).cloned()
    }

    pub fn get_profile(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.iter().find(|p| p.id == user_id).cloned()
    }

    pub fn upsert_profile(&mut self, profile: UserProfile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => *slot = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn get_tool(&self, tool_id: &str) -> Option<Tool> {
        self.tools.iter().find(|t| t.id == tool_id).cloned()
    }

    pub fn upsert_tool(&mut self, tool: Tool) {
        match self.tools.iter_mut().find(|t| t.id == tool.id) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }
}
