//! Organization UI customization: vertical, branding, dashboard text and the
//! departments shown in navigation

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tenant industry mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Church,
    #[default]
    Business,
    Estate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub company_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// `#rrggbb`
    pub primary_color: String,
    /// `#rrggbb`
    pub secondary_color: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "My Organization".to_string(),
            logo_url: None,
            primary_color: "#1e40af".to_string(),
            secondary_color: "#64748b".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardText {
    pub welcome_title: String,
    #[serde(default)]
    pub welcome_subtitle: Option<String>,
    #[serde(default)]
    pub footer_text: Option<String>,
}

impl Default for DashboardText {
    fn default() -> Self {
        Self {
            welcome_title: "Welcome".to_string(),
            welcome_subtitle: None,
            footer_text: None,
        }
    }
}

/// Row of `organization_ui_customizations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUiCustomization {
    pub organization_id: String,
    pub vertical: Vertical,
    pub branding: Branding,
    pub dashboard_text: DashboardText,
    #[serde(default)]
    pub enabled_departments: Vec<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrganizationUiCustomization {
    /// Customization shown when none is stored
    pub fn defaults(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            vertical: Vertical::default(),
            branding: Branding::default(),
            dashboard_text: DashboardText::default(),
            enabled_departments: Vec::new(),
            updated_by: None,
            updated_at: None,
        }
    }

    /// Apply an update, leaving unset fields untouched
    pub fn merged(mut self, update: CustomizationUpdate) -> Self {
        if let Some(vertical) = update.vertical {
            self.vertical = vertical;
        }
        if let Some(branding) = update.branding {
            self.branding = branding;
        }
        if let Some(dashboard_text) = update.dashboard_text {
            self.dashboard_text = dashboard_text;
        }
        if let Some(enabled_departments) = update.enabled_departments {
            self.enabled_departments = enabled_departments;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.branding.company_name.trim().is_empty() {
            return Err(Error::Validation("company name must not be blank".to_string()));
        }
        if self.dashboard_text.welcome_title.trim().is_empty() {
            return Err(Error::Validation("welcome title must not be blank".to_string()));
        }
        for color in [&self.branding.primary_color, &self.branding.secondary_color] {
            if !is_hex_color(color) {
                return Err(Error::Validation(format!(
                    "invalid color '{}', expected #rrggbb",
                    color
                )));
            }
        }

        let mut seen = HashSet::new();
        for department in &self.enabled_departments {
            if department.trim().is_empty() {
                return Err(Error::Validation("department ids must not be blank".to_string()));
            }
            if !seen.insert(department.as_str()) {
                return Err(Error::Validation(format!(
                    "department '{}' is listed twice",
                    department
                )));
            }
        }
        Ok(())
    }
}

/// Partial customization update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationUpdate {
    #[serde(default)]
    pub vertical: Option<Vertical>,
    #[serde(default)]
    pub branding: Option<Branding>,
    #[serde(default)]
    pub dashboard_text: Option<DashboardText>,
    #[serde(default)]
    pub enabled_departments: Option<Vec<String>>,
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
