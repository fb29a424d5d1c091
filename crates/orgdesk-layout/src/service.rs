//! Department composition and customization service

use std::sync::Arc;

use chrono::Utc;
use orgdesk_events::{ChangeBus, ChangeEvent, ChangeKind, Table};
use orgdesk_permissions::ActorContext;

use crate::customization::{CustomizationUpdate, OrganizationUiCustomization};
use crate::error::{Error, Result};
use crate::models::{ItemUpdate, NewItem, SectionItem, SectionKind};
use crate::reorder::{changed_positions, reorder};
use crate::storage::{LayoutStore, SectionKey};

/// Service facade over a [`LayoutStore`]
#[derive(Clone)]
pub struct LayoutService {
    store: Arc<dyn LayoutStore>,
    bus: ChangeBus,
}

impl LayoutService {
    pub fn new(store: Arc<dyn LayoutStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &Arc<dyn LayoutStore> {
        &self.store
    }

    /// Items of one section of the caller's organization, in display order
    pub async fn list_section(
        &self,
        ctx: &ActorContext,
        department_id: &str,
        kind: SectionKind,
    ) -> Result<Vec<SectionItem>> {
        self.store
            .list_section(section_key(ctx, department_id, kind))
            .await
    }

    /// Append a new item at the end of its section
    pub async fn create_item(
        &self,
        ctx: &ActorContext,
        department_id: &str,
        kind: SectionKind,
        new: NewItem,
    ) -> Result<SectionItem> {
        ctx.require_admin()?;
        require_title(&new.title)?;
        require_kind(kind, &new.details)?;

        let existing = self
            .store
            .list_section(section_key(ctx, department_id, kind))
            .await?;
        let display_order = existing
            .iter()
            .map(|item| item.display_order + 1)
            .max()
            .unwrap_or(0);

        let now = Utc::now();
        let item = SectionItem {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: ctx.organization_id.clone(),
            department_id: department_id.to_string(),
            title: new.title.trim().to_string(),
            description: new.description,
            icon: new.icon,
            display_order,
            is_active: new.is_active,
            details: new.details,
            created_at: now,
            updated_at: now,
        };

        self.store.put_item(item.clone()).await?;
        self.publish(&item, ChangeKind::Insert);
        tracing::info!(
            item_id = %item.id,
            department_id = %department_id,
            section = %kind,
            "Section item created"
        );
        Ok(item)
    }

    pub async fn update_item(
        &self,
        ctx: &ActorContext,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<SectionItem> {
        ctx.require_admin()?;
        let mut item = self.owned_item(ctx, item_id).await?;

        if let Some(title) = update.title {
            require_title(&title)?;
            item.title = title.trim().to_string();
        }
        if let Some(details) = update.details {
            require_kind(item.section(), &details)?;
            item.details = details;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(icon) = update.icon {
            item.icon = icon;
        }
        if let Some(is_active) = update.is_active {
            item.is_active = is_active;
        }
        item.updated_at = Utc::now();

        self.store.put_item(item.clone()).await?;
        self.publish(&item, ChangeKind::Update);
        tracing::debug!(item_id = %item.id, "Section item updated");
        Ok(item)
    }

    pub async fn delete_item(&self, ctx: &ActorContext, item_id: &str) -> Result<()> {
        ctx.require_admin()?;
        let item = self.owned_item(ctx, item_id).await?;
        self.store.delete_item(&item.id).await?;
        self.publish(&item, ChangeKind::Delete);
        tracing::info!(item_id = %item.id, "Section item deleted");
        Ok(())
    }

    /// Move `moved_id` onto the position of `target_id` and persist the result
    ///
    /// Every position in the section is written in one store call, guarded by
    /// the order that was read. If another writer changed the section first,
    /// nothing is written and [`Error::Conflict`] is returned; the caller
    /// re-lists and retries. Returns the stored list after the write.
    pub async fn reorder_section(
        &self,
        ctx: &ActorContext,
        department_id: &str,
        kind: SectionKind,
        moved_id: &str,
        target_id: &str,
    ) -> Result<Vec<SectionItem>> {
        ctx.require_admin()?;
        let key = section_key(ctx, department_id, kind);
        let before = self.store.list_section(key).await?;

        for id in [moved_id, target_id] {
            if !before.iter().any(|item| item.id == id) {
                return Err(Error::not_found("Section item", id));
            }
        }

        let after = reorder(before.clone(), moved_id, target_id);
        let changed = changed_positions(&before, &after);
        if !changed.is_empty() {
            let expected: Vec<String> = before.iter().map(|item| item.id.clone()).collect();
            let order: Vec<String> = after.iter().map(|item| item.id.clone()).collect();
            if let Err(e) = self.store.write_orders(key, &expected, &order).await {
                match &e {
                    Error::Conflict(_) => tracing::warn!(
                        department_id = %department_id,
                        section = %kind,
                        "Section changed during reorder"
                    ),
                    _ => tracing::error!(
                        department_id = %department_id,
                        section = %kind,
                        error = %e,
                        "Reorder failed"
                    ),
                }
                return Err(e);
            }
            self.bus.publish_all(changed.iter().map(|(id, _)| {
                ChangeEvent::new(kind.table(), ChangeKind::Update, id.clone())
                    .for_organization(ctx.organization_id.clone())
            }));
        }

        tracing::info!(
            department_id = %department_id,
            section = %kind,
            moved = %moved_id,
            target = %target_id,
            changed = changed.len(),
            "Section reordered"
        );
        self.store.list_section(key).await
    }

    /// Stored customization, or the defaults when none is saved
    pub async fn get_customization(
        &self,
        ctx: &ActorContext,
        organization_id: &str,
    ) -> Result<OrganizationUiCustomization> {
        ctx.require_organization(organization_id)?;
        Ok(self
            .store
            .get_customization(organization_id)
            .await?
            .unwrap_or_else(|| OrganizationUiCustomization::defaults(organization_id)))
    }

    pub async fn save_customization(
        &self,
        ctx: &ActorContext,
        organization_id: &str,
        update: CustomizationUpdate,
    ) -> Result<OrganizationUiCustomization> {
        ctx.require_admin()?;
        ctx.require_organization(organization_id)?;

        let existing = self.store.get_customization(organization_id).await?;
        let kind = if existing.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        };
        let mut customization = existing
            .unwrap_or_else(|| OrganizationUiCustomization::defaults(organization_id))
            .merged(update);
        customization.validate()?;
        customization.updated_by = Some(ctx.user_id.clone());
        customization.updated_at = Some(Utc::now());

        self.store.put_customization(customization.clone()).await?;
        self.bus.publish(
            ChangeEvent::new(Table::OrganizationUiCustomizations, kind, organization_id)
                .for_organization(organization_id),
        );
        tracing::info!(organization_id = %organization_id, "Customization saved");
        Ok(customization)
    }

    /// Drop the stored customization, returning the defaults
    pub async fn reset_customization(
        &self,
        ctx: &ActorContext,
        organization_id: &str,
    ) -> Result<OrganizationUiCustomization> {
        ctx.require_admin()?;
        ctx.require_organization(organization_id)?;

        if self.store.get_customization(organization_id).await?.is_some() {
            self.store.delete_customization(organization_id).await?;
            self.bus.publish(
                ChangeEvent::new(
                    Table::OrganizationUiCustomizations,
                    ChangeKind::Delete,
                    organization_id,
                )
                .for_organization(organization_id),
            );
            tracing::info!(organization_id = %organization_id, "Customization reset");
        }
        Ok(OrganizationUiCustomization::defaults(organization_id))
    }

    /// Load an item the caller's organization owns
    async fn owned_item(&self, ctx: &ActorContext, item_id: &str) -> Result<SectionItem> {
        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or_else(|| Error::not_found("Section item", item_id))?;
        ctx.require_organization(&item.organization_id)?;
        Ok(item)
    }

    fn publish(&self, item: &SectionItem, kind: ChangeKind) {
        self.bus.publish(
            ChangeEvent::new(item.section().table(), kind, item.id.clone())
                .for_organization(item.organization_id.clone()),
        );
    }
}

fn section_key<'a>(ctx: &'a ActorContext, department_id: &'a str, kind: SectionKind) -> SectionKey<'a> {
    SectionKey {
        organization_id: &ctx.organization_id,
        department_id,
        kind,
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be blank".to_string()));
    }
    Ok(())
}

fn require_kind(kind: SectionKind, details: &crate::models::ItemDetails) -> Result<()> {
    if details.section() != kind {
        return Err(Error::Validation(format!(
            "{} item cannot be stored in the {} section",
            details.section(),
            kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemDetails;
    use crate::storage::InMemoryLayoutStore;
    use orgdesk_permissions::PermissionLevel;

    fn service() -> LayoutService {
        LayoutService::new(Arc::new(InMemoryLayoutStore::new()), ChangeBus::new())
    }

    fn admin() -> ActorContext {
        ActorContext::new("admin-1", "org-1", PermissionLevel::Admin)
    }

    fn feature(title: &str) -> NewItem {
        NewItem::new(title, ItemDetails::Feature { route: None })
    }

    async fn seed(service: &LayoutService, titles: &[&str]) -> Vec<SectionItem> {
        let mut items = Vec::new();
        for title in titles {
            items.push(
                service
                    .create_item(&admin(), "finance", SectionKind::Features, feature(title))
                    .await
                    .unwrap(),
            );
        }
        items
    }

    fn titles(items: &[SectionItem]) -> Vec<&str> {
        items.iter().map(|item| item.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_new_items_append_to_section() {
        let service = service();
        let items = seed(&service, &["Budgets", "Payroll", "Invoices"]).await;
        assert_eq!(items[2].display_order, 2);

        let listed = service
            .list_section(&admin(), "finance", SectionKind::Features)
            .await
            .unwrap();
        assert_eq!(titles(&listed), vec!["Budgets", "Payroll", "Invoices"]);
    }

    #[tokio::test]
    async fn test_create_rejects_mismatched_section() {
        let service = service();
        let result = service
            .create_item(&admin(), "finance", SectionKind::Tools, feature("Budgets"))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_edit() {
        let service = service();
        let viewer = ActorContext::new("emp-1", "org-1", PermissionLevel::Employee);
        let result = service
            .create_item(&viewer, "finance", SectionKind::Features, feature("Budgets"))
            .await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_reorder_persists_and_publishes() {
        let service = service();
        let items = seed(&service, &["A", "B", "C", "D"]).await;
        let mut events = service.bus.subscribe();

        let result = service
            .reorder_section(&admin(), "finance", SectionKind::Features, &items[0].id, &items[2].id)
            .await
            .unwrap();
        assert_eq!(titles(&result), vec!["B", "C", "A", "D"]);
        assert!(result.iter().enumerate().all(|(i, item)| item.display_order == i));

        let mut updated = 0;
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.table, Table::DepartmentFeatures);
            assert_eq!(event.kind, ChangeKind::Update);
            updated += 1;
        }
        assert_eq!(updated, 3);
    }

    #[tokio::test]
    async fn test_reorder_unknown_item() {
        let service = service();
        let items = seed(&service, &["A", "B"]).await;
        let result = service
            .reorder_section(&admin(), "finance", SectionKind::Features, "ghost", &items[0].id)
            .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_foreign_item_is_unauthorized() {
        let service = service();
        let items = seed(&service, &["A"]).await;
        let other = ActorContext::new("admin-2", "org-2", PermissionLevel::Admin);
        let result = service.delete_item(&other, &items[0].id).await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let service = service();
        let items = seed(&service, &["A", "B"]).await;
        let updated = service
            .update_item(
                &admin(),
                &items[1].id,
                ItemUpdate {
                    title: Some("Bee".to_string()),
                    is_active: Some(false),
                    ..ItemUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_order, 1);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_fields() {
        let service = service();
        let mut new = feature("Budgets");
        new.description = Some("Annual plan".to_string());
        new.icon = Some("wallet".to_string());
        let item = service
            .create_item(&admin(), "finance", SectionKind::Features, new)
            .await
            .unwrap();

        let kept = service
            .update_item(&admin(), &item.id, ItemUpdate::default())
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("Annual plan"));
        assert_eq!(kept.icon.as_deref(), Some("wallet"));

        let cleared = service
            .update_item(
                &admin(),
                &item.id,
                ItemUpdate {
                    description: Some(None),
                    icon: Some(None),
                    ..ItemUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.icon, None);
    }

    #[tokio::test]
    async fn test_customization_lifecycle() {
        let service = service();
        let ctx = admin();

        let defaults = service.get_customization(&ctx, "org-1").await.unwrap();
        assert_eq!(defaults, OrganizationUiCustomization::defaults("org-1"));

        let saved = service
            .save_customization(
                &ctx,
                "org-1",
                CustomizationUpdate {
                    vertical: Some(crate::customization::Vertical::Estate),
                    ..CustomizationUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.updated_by.as_deref(), Some("admin-1"));

        let reset = service.reset_customization(&ctx, "org-1").await.unwrap();
        assert_eq!(reset, OrganizationUiCustomization::defaults("org-1"));
        assert!(service.store.get_customization("org-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_customization_scoped_to_organization() {
        let service = service();
        let result = service.get_customization(&admin(), "org-2").await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }
}
