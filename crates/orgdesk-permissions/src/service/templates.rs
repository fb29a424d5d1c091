//! Permission template management

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::context::ActorContext;
use crate::error::{Error, Result};
use crate::permission::{system_templates, PermissionLevel, PermissionTemplate, ToolPermissions};
use crate::storage::Mutation;

use super::{require_non_blank, PermissionService};

/// Payload for creating a custom template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub tool_permissions: ToolPermissions,
}

/// Partial update of a custom template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_level: Option<PermissionLevel>,
    #[serde(default)]
    pub tool_permissions: Option<ToolPermissions>,
}

impl PermissionService {
    pub async fn list_templates(&self) -> Result<Vec<PermissionTemplate>> {
        let mut templates = self.store.list_templates().await?;
        templates.sort_by(|a, b| {
            a.permission_level
                .cmp(&b.permission_level)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(templates)
    }

    pub async fn get_template(&self, id: &str) -> Result<PermissionTemplate> {
        self.store
            .get_template(id)
            .await?
            .ok_or_else(|| Error::not_found("Permission template", id))
    }

    pub async fn create_template(
        &self,
        ctx: &ActorContext,
        new: NewTemplate,
    ) -> Result<PermissionTemplate> {
        ctx.require_admin()?;
        require_non_blank("name", &new.name)?;
        self.validate_tool_permissions(&new.tool_permissions)?;

        let template = PermissionTemplate::new(
            new.name.trim(),
            new.permission_level,
            new.tool_permissions,
            Utc::now(),
        )
        .with_description(new.description);

        self.commit(vec![Mutation::UpsertTemplate(template.clone())], None)
            .await?;
        tracing::info!(template_id = %template.id, name = %template.name, "Template created");
        Ok(template)
    }

    pub async fn update_template(
        &self,
        ctx: &ActorContext,
        id: &str,
        update: TemplateUpdate,
    ) -> Result<PermissionTemplate> {
        ctx.require_admin()?;
        let mut template = self.get_template(id).await?;
        if template.is_system_template {
            return Err(Error::ImmutableTemplate(template.name));
        }

        if let Some(name) = update.name {
            require_non_blank("name", &name)?;
            template.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            template.description = description;
        }
        if let Some(level) = update.permission_level {
            template.permission_level = level;
        }
        if let Some(tool_permissions) = update.tool_permissions {
            self.validate_tool_permissions(&tool_permissions)?;
            template.tool_permissions = tool_permissions;
        }
        template.updated_at = Utc::now();

        self.commit(vec![Mutation::UpsertTemplate(template.clone())], None)
            .await?;
        tracing::info!(template_id = %id, "Template updated");
        Ok(template)
    }

    pub async fn delete_template(&self, ctx: &ActorContext, id: &str) -> Result<()> {
        ctx.require_admin()?;
        let template = self.get_template(id).await?;
        if template.is_system_template {
            return Err(Error::ImmutableTemplate(template.name));
        }

        self.commit(vec![Mutation::DeleteTemplate(id.to_string())], None)
            .await?;
        tracing::info!(template_id = %id, "Template deleted");
        Ok(())
    }

    /// Install the missing system templates; returns how many were added
    pub async fn seed_system_templates(&self) -> Result<usize> {
        let existing = self.store.list_templates().await?;
        let missing: Vec<_> = system_templates(Utc::now())
            .into_iter()
            .filter(|template| !existing.iter().any(|t| t.id == template.id))
            .map(Mutation::UpsertTemplate)
            .collect();

        let added = missing.len();
        if added > 0 {
            self.commit(missing, None).await?;
            tracing::info!(added, "Seeded system templates");
        }
        Ok(added)
    }

    fn validate_tool_permissions(&self, tool_permissions: &ToolPermissions) -> Result<()> {
        for entry in tool_permissions
            .allowed_tools
            .iter()
            .chain(&tool_permissions.denied_tools)
        {
            self.matcher.validate_pattern(entry)?;
        }

        let overlap = tool_permissions.overlapping_entries();
        if !overlap.is_empty() {
            return Err(Error::Validation(format!(
                "tools both allowed and denied: {}",
                overlap.join(", ")
            )));
        }
        Ok(())
    }
}
