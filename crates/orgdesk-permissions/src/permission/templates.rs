//! Built-in system templates

use chrono::{DateTime, Utc};

use crate::permission::models::{PermissionLevel, PermissionTemplate, ToolPermissions};

/// Stable id of the system template for a level
pub fn system_template_id(level: PermissionLevel) -> String {
    format!("system-{}", level)
}

/// One immutable template per permission level
///
/// Admin tiers get every tool. Lower tiers start with empty allow lists that
/// operators extend through custom templates.
pub fn system_templates(now: DateTime<Utc>) -> Vec<PermissionTemplate> {
    PermissionLevel::ALL
        .into_iter()
        .map(|level| {
            let (tool_permissions, description) = match level {
                PermissionLevel::MasterAdmin | PermissionLevel::Admin => {
                    (ToolPermissions::all(), "Full access to every tool")
                }
                PermissionLevel::Manager => {
                    (ToolPermissions::default(), "Managers; no tools granted by default")
                }
                PermissionLevel::Employee => {
                    (ToolPermissions::default(), "Employees; no tools granted by default")
                }
                PermissionLevel::Viewer => {
                    (ToolPermissions::default(), "Read-only users; no tools granted")
                }
            };

            PermissionTemplate {
                id: system_template_id(level),
                name: display_name(level).to_string(),
                description: description.to_string(),
                permission_level: level,
                tool_permissions,
                is_system_template: true,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

fn display_name(level: PermissionLevel) -> &'static str {
    match level {
        PermissionLevel::Viewer => "Viewer",
        PermissionLevel::Employee => "Employee",
        PermissionLevel::Manager => "Manager",
        PermissionLevel::Admin => "Admin",
        PermissionLevel::MasterAdmin => "Master Admin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_system_template_per_level() {
        let templates = system_templates(Utc::now());
        assert_eq!(templates.len(), PermissionLevel::ALL.len());
        assert!(templates.iter().all(|t| t.is_system_template));

        let admin = templates
            .iter()
            .find(|t| t.permission_level == PermissionLevel::Admin)
            .unwrap();
        assert!(admin.tool_permissions.all);
        assert_eq!(admin.id, "system-admin");

        let viewer = templates
            .iter()
            .find(|t| t.permission_level == PermissionLevel::Viewer)
            .unwrap();
        assert!(!viewer.tool_permissions.all);
        assert!(viewer.tool_permissions.allowed_tools.is_empty());
    }
}
