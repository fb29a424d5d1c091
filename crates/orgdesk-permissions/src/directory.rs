//! User directory and tool catalog rows

use serde::{Deserialize, Serialize};

use crate::permission::PermissionLevel;

/// A user as known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub full_name: String,
    pub permission_level: PermissionLevel,
}

impl UserProfile {
    /// Create a new profile
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        permission_level: PermissionLevel,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            email: email.into(),
            full_name: full_name.into(),
            permission_level,
        }
    }
}

/// A gated tool in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Tool {
    /// Create a new catalog entry
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
