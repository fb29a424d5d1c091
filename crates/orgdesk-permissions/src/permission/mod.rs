//! Permission levels, explicit grants, templates and access resolution

pub mod checker;
pub mod models;
pub mod templates;

pub use checker::{PermissionCheckResult, PermissionChecker, PermissionSource};
pub use models::{PermissionLevel, PermissionTemplate, ToolPermissions, UserPermission};
pub use templates::{system_template_id, system_templates};
