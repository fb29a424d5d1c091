//! Persistence for department sections and customizations

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::customization::OrganizationUiCustomization;
use crate::error::{Error, Result};
use crate::models::{SectionItem, SectionKind};

/// Identifies one section of one department
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionKey<'a> {
    pub organization_id: &'a str,
    pub department_id: &'a str,
    pub kind: SectionKind,
}

/// Storage backend for [`crate::LayoutService`]
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Items of one section, in display order
    async fn list_section(&self, key: SectionKey<'_>) -> Result<Vec<SectionItem>>;

    async fn get_item(&self, id: &str) -> Result<Option<SectionItem>>;

    /// Insert or replace an item by id
    async fn put_item(&self, item: SectionItem) -> Result<()>;

    async fn delete_item(&self, id: &str) -> Result<()>;

    /// Rewrite the display order of a whole section
    ///
    /// `expected` is the section's ids in display order as the caller read
    /// them; `order` is the same ids in their new order, stored as positions
    /// `0..n`. When the stored section no longer matches `expected` nothing
    /// is written and [`Error::Conflict`] is returned.
    async fn write_orders(
        &self,
        key: SectionKey<'_>,
        expected: &[String],
        order: &[String],
    ) -> Result<()>;

    async fn get_customization(
        &self,
        organization_id: &str,
    ) -> Result<Option<OrganizationUiCustomization>>;

    async fn put_customization(&self, customization: OrganizationUiCustomization) -> Result<()>;

    async fn delete_customization(&self, organization_id: &str) -> Result<()>;
}

/// Image of the layout tables; also the file store's snapshot format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTables {
    #[serde(default)]
    pub items: Vec<SectionItem>,
    #[serde(default)]
    pub customizations: Vec<OrganizationUiCustomization>,
}

impl LayoutTables {
    fn list_section(&self, key: SectionKey<'_>) -> Vec<SectionItem> {
        let mut items: Vec<_> = self
            .items
            .iter()
            .filter(|item| item.in_section(key.organization_id, key.department_id, key.kind))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.display_order);
        items
    }

    fn get_item(&self, id: &str) -> Option<SectionItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn put_item(&mut self, item: SectionItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    fn delete_item(&mut self, id: &str) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(Error::not_found("Section item", id));
        }
        Ok(())
    }

    fn write_orders(&mut self, key: SectionKey<'_>, expected: &[String], order: &[String]) -> Result<()> {
        let current: Vec<String> = self.list_section(key).into_iter().map(|item| item.id).collect();
        if current != expected {
            return Err(Error::Conflict(format!(
                "{} section of {} changed since it was read",
                key.kind, key.department_id
            )));
        }

        let mut listed = order.to_vec();
        listed.sort();
        let mut stored = current;
        stored.sort();
        if listed != stored {
            return Err(Error::Validation(
                "new order must list every item of the section exactly once".to_string(),
            ));
        }

        let positions: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(position, id)| (id.as_str(), position))
            .collect();
        for item in &mut self.items {
            if !item.in_section(key.organization_id, key.department_id, key.kind) {
                continue;
            }
            if let Some(position) = positions.get(item.id.as_str()) {
                item.display_order = *position;
            }
        }
        Ok(())
    }

    fn get_customization(&self, organization_id: &str) -> Option<OrganizationUiCustomization> {
        self.customizations
            .iter()
            .find(|c| c.organization_id == organization_id)
            .cloned()
    }

    fn put_customization(&mut self, customization: OrganizationUiCustomization) {
        match self
            .customizations
            .iter_mut()
            .find(|c| c.organization_id == customization.organization_id)
        {
            Some(slot) => *slot = customization,
            None => self.customizations.push(customization),
        }
    }

    fn delete_customization(&mut self, organization_id: &str) {
        self.customizations.retain(|c| c.organization_id != organization_id);
    }
}

/// Thread-safe in-memory implementation of [`LayoutStore`]
#[derive(Debug, Default)]
pub struct InMemoryLayoutStore {
    tables: RwLock<LayoutTables>,
}

impl InMemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutStore for InMemoryLayoutStore {
    async fn list_section(&self, key: SectionKey<'_>) -> Result<Vec<SectionItem>> {
        Ok(self.tables.read().list_section(key))
    }

    async fn get_item(&self, id: &str) -> Result<Option<SectionItem>> {
        Ok(self.tables.read().get_item(id))
    }

    async fn put_item(&self, item: SectionItem) -> Result<()> {
        self.tables.write().put_item(item);
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        self.tables.write().delete_item(id)
    }

    async fn write_orders(
        &self,
        key: SectionKey<'_>,
        expected: &[String],
        order: &[String],
    ) -> Result<()> {
        self.tables.write().write_orders(key, expected, order)
    }

    async fn get_customization(
        &self,
        organization_id: &str,
    ) -> Result<Option<OrganizationUiCustomization>> {
        Ok(self.tables.read().get_customization(organization_id))
    }

    async fn put_customization(&self, customization: OrganizationUiCustomization) -> Result<()> {
        self.tables.write().put_customization(customization);
        Ok(())
    }

    async fn delete_customization(&self, organization_id: &str) -> Result<()> {
        self.tables.write().delete_customization(organization_id);
        Ok(())
    }
}

/// JSON snapshot implementation of [`LayoutStore`]
///
/// Each write is applied to a copy, persisted, then swapped in, so a failed
/// write changes neither the file nor memory.
#[derive(Debug)]
pub struct FileLayoutStore {
    path: PathBuf,
    tables: RwLock<LayoutTables>,
}

impl FileLayoutStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            LayoutTables::default()
        };
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Open `layout.json` inside `data_dir`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::open(data_dir.as_ref().join("layout.json"))
    }

    fn write_with<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut LayoutTables) -> Result<()>,
    {
        let mut tables = self.tables.write();
        let mut next = tables.clone();
        update(&mut next)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&next)?)?;
        *tables = next;
        Ok(())
    }
}

#[async_trait]
impl LayoutStore for FileLayoutStore {
    async fn list_section(&self, key: SectionKey<'_>) -> Result<Vec<SectionItem>> {
        Ok(self.tables.read().list_section(key))
    }

    async fn get_item(&self, id: &str) -> Result<Option<SectionItem>> {
        Ok(self.tables.read().get_item(id))
    }

    async fn put_item(&self, item: SectionItem) -> Result<()> {
        self.write_with(|tables| {
            tables.put_item(item);
            Ok(())
        })
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        self.write_with(|tables| tables.delete_item(id))
    }

    async fn write_orders(
        &self,
        key: SectionKey<'_>,
        expected: &[String],
        order: &[String],
    ) -> Result<()> {
        self.write_with(|tables| tables.write_orders(key, expected, order))
    }

    async fn get_customization(
        &self,
        organization_id: &str,
    ) -> Result<Option<OrganizationUiCustomization>> {
        Ok(self.tables.read().get_customization(organization_id))
    }

    async fn put_customization(&self, customization: OrganizationUiCustomization) -> Result<()> {
        self.write_with(|tables| {
            tables.put_customization(customization);
            Ok(())
        })
    }

    async fn delete_customization(&self, organization_id: &str) -> Result<()> {
        self.write_with(|tables| {
            tables.delete_customization(organization_id);
            Ok(())
        })
    }
}
