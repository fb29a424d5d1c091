//! Tool-access resolution
//!
//! Resolution is a pure function of the subject's profile, their explicit
//! permission row for the tool and the available templates. First match wins:
//!
//! 1. an unexpired explicit row (`granted` decides)
//! 2. `master_admin` role
//! 3. the template for the subject's level (custom before system, then by name)
//! 4. default deny

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::UserProfile;
use crate::glob_matcher::GlobMatcher;
use crate::permission::models::{PermissionLevel, PermissionTemplate, UserPermission};

/// Where an access decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    Role,
    Template,
    Override,
    Denied,
}

impl std::fmt::Display for PermissionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionSource::Role => write!(f, "role"),
            PermissionSource::Template => write!(f, "template"),
            PermissionSource::Override => write!(f, "override"),
            PermissionSource::Denied => write!(f, "denied"),
        }
    }
}

/// Outcome of a tool-access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheckResult {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub permission_level: PermissionLevel,
    pub source: PermissionSource,
}

impl PermissionCheckResult {
    fn allow(level: PermissionLevel, source: PermissionSource, reason: String) -> Self {
        Self {
            allowed: true,
            reason: Some(reason),
            permission_level: level,
            source,
        }
    }

    fn deny(level: PermissionLevel, source: PermissionSource, reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            permission_level: level,
            source,
        }
    }
}

/// Evaluates access for one user and tool
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionChecker {
    matcher: GlobMatcher,
}

impl PermissionChecker {
    pub fn new() -> Self {
        Self {
            matcher: GlobMatcher::new(),
        }
    }

    /// Resolve access for `tool_id`
    ///
    /// `explicit` is the subject's row for the tool, if any. `templates` may
    /// contain templates for every level; only those for the subject's level
    /// are considered.
    pub fn resolve(
        &self,
        profile: Option<&UserProfile>,
        explicit: Option<&UserPermission>,
        templates: &[PermissionTemplate],
        tool_id: &str,
        now: DateTime<Utc>,
    ) -> PermissionCheckResult {
        let Some(profile) = profile else {
            return PermissionCheckResult::deny(
                PermissionLevel::Viewer,
                PermissionSource::Denied,
                "unknown user".to_string(),
            );
        };
        let level = profile.permission_level;

        if let Some(row) = explicit.filter(|row| !row.is_expired(now)) {
            return if row.granted {
                PermissionCheckResult::allow(
                    level,
                    PermissionSource::Override,
                    format!("explicit grant by {}", row.granted_by),
                )
            } else {
                PermissionCheckResult::deny(
                    level,
                    PermissionSource::Override,
                    "access explicitly revoked".to_string(),
                )
            };
        }

        if level == PermissionLevel::MasterAdmin {
            return PermissionCheckResult::allow(
                level,
                PermissionSource::Role,
                "master_admin has access to every tool".to_string(),
            );
        }

        if let Some(template) = Self::select_template(templates, level) {
            if let Some(result) = self.evaluate_template(template, level, tool_id) {
                return result;
            }
        }

        PermissionCheckResult::deny(
            level,
            PermissionSource::Denied,
            format!("no permission grants {} access to {}", level, tool_id),
        )
    }

    /// Pick the template governing `level`
    ///
    /// Custom templates take precedence over system templates; ties are broken
    /// by name.
    pub fn select_template(
        templates: &[PermissionTemplate],
        level: PermissionLevel,
    ) -> Option<&PermissionTemplate> {
        templates
            .iter()
            .filter(|template| template.permission_level == level)
            .min_by(|a, b| {
                a.is_system_template
                    .cmp(&b.is_system_template)
                    .then_with(|| a.name.cmp(&b.name))
            })
    }

    fn evaluate_template(
        &self,
        template: &PermissionTemplate,
        level: PermissionLevel,
        tool_id: &str,
    ) -> Option<PermissionCheckResult> {
        let lists = &template.tool_permissions;

        if lists.all {
            return Some(PermissionCheckResult::allow(
                level,
                PermissionSource::Template,
                format!("template '{}' grants all tools", template.name),
            ));
        }

        // A denied match wins over any allowed match
        if let Some(entry) = self.matcher.most_specific_match(&lists.denied_tools, tool_id) {
            return Some(PermissionCheckResult::deny(
                level,
                PermissionSource::Template,
                format!("template '{}' denies '{}'", template.name, entry),
            ));
        }

        self.matcher
            .most_specific_match(&lists.allowed_tools, tool_id)
            .map(|entry| {
                PermissionCheckResult::allow(
                    level,
                    PermissionSource::Template,
                    format!("template '{}' allows '{}'", template.name, entry),
                )
            })
    }
}
