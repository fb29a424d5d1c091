//! Department composition rows

use std::str::FromStr;

use chrono::{DateTime, Utc};
use orgdesk_events::Table;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::reorder::Orderable;

/// One kind of department composition list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    StatCards,
    Features,
    Tools,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::StatCards => "stat_cards",
            SectionKind::Features => "features",
            SectionKind::Tools => "tools",
        }
    }

    /// Backing table
    pub fn table(&self) -> Table {
        match self {
            SectionKind::StatCards => Table::DepartmentStatCards,
            SectionKind::Features => Table::DepartmentFeatures,
            SectionKind::Tools => Table::DepartmentTools,
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stat_cards" | "stat-cards" => Ok(SectionKind::StatCards),
            "features" => Ok(SectionKind::Features),
            "tools" => Ok(SectionKind::Tools),
            other => Err(Error::Validation(format!("unknown section: {}", other))),
        }
    }
}

/// Fields specific to each section kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDetails {
    StatCard {
        value: String,
        #[serde(default)]
        trend: Option<String>,
    },
    Feature {
        #[serde(default)]
        route: Option<String>,
    },
    Tool {
        #[serde(default)]
        url: Option<String>,
    },
}

impl ItemDetails {
    pub fn section(&self) -> SectionKind {
        match self {
            ItemDetails::StatCard { .. } => SectionKind::StatCards,
            ItemDetails::Feature { .. } => SectionKind::Features,
            ItemDetails::Tool { .. } => SectionKind::Tools,
        }
    }
}

/// A stat card, feature or tool shown on a department page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionItem {
    pub id: String,
    pub organization_id: String,
    pub department_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub display_order: usize,
    pub is_active: bool,
    #[serde(flatten)]
    pub details: ItemDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SectionItem {
    pub fn section(&self) -> SectionKind {
        self.details.section()
    }

    /// Whether the item belongs to the given section of a department
    pub fn in_section(&self, organization_id: &str, department_id: &str, kind: SectionKind) -> bool {
        self.organization_id == organization_id
            && self.department_id == department_id
            && self.section() == kind
    }
}

impl Orderable for SectionItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_order(&self) -> usize {
        self.display_order
    }

    fn set_display_order(&mut self, order: usize) {
        self.display_order = order;
    }
}

/// Payload for creating an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub details: ItemDetails,
}

fn default_active() -> bool {
    true
}

impl NewItem {
    pub fn new(title: impl Into<String>, details: ItemDetails) -> Self {
        Self {
            title: title.into(),
            description: None,
            icon: None,
            is_active: true,
            details,
        }
    }
}

/// Partial update of an item; `display_order` only changes through reordering
///
/// `description` and `icon` distinguish an absent field (keep) from an
/// explicit `null` (clear).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub details: Option<ItemDetails>,
}

/// Wraps whatever is present, `null` included, so only a missing field
/// falls back to `None`
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
