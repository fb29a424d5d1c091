//! Permission services
//!
//! [`PermissionService`] owns every operation on requests, grants, templates
//! and the audit trail. Each write is one [`ChangeSet`] committed through the
//! store; change events are published only after the commit succeeds.

mod access;
mod admin;
mod audit;
mod directory;
mod requests;
mod review;
mod templates;

pub use access::CheckLogging;
pub use admin::{BulkGrant, BulkGrantSummary, SweepReport};
pub use templates::{NewTemplate, TemplateUpdate};

use std::collections::HashSet;
use std::sync::Arc;

use orgdesk_events::ChangeBus;
use serde::Serialize;
use serde_json::Value;

use crate::context::ActorContext;
use crate::error::{Result, StoreResult};
use crate::glob_matcher::GlobMatcher;
use crate::permission::PermissionChecker;
use crate::settings::PermissionSettings;
use crate::storage::{ChangeSet, PermissionStore};

/// Service facade over a [`PermissionStore`]
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
    bus: ChangeBus,
    settings: PermissionSettings,
    checker: PermissionChecker,
    matcher: GlobMatcher,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PermissionStore>, bus: ChangeBus, settings: PermissionSettings) -> Self {
        Self {
            store,
            bus,
            settings,
            checker: PermissionChecker::new(),
            matcher: GlobMatcher::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn PermissionStore> {
        &self.store
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn settings(&self) -> &PermissionSettings {
        &self.settings
    }

    /// Commit a change set and announce it
    async fn commit(&self, changes: ChangeSet, organization_id: Option<&str>) -> StoreResult<()> {
        let events: Vec<_> = changes
            .iter()
            .map(|mutation| {
                let event = mutation.change_event();
                match organization_id {
                    Some(org) => event.for_organization(org),
                    None => event,
                }
            })
            .collect();

        self.store.apply(changes).await?;
        self.bus.publish_all(events);
        Ok(())
    }

    /// Organization of a directory user, if known
    async fn organization_of(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get_profile(user_id)
            .await?
            .map(|profile| profile.organization_id))
    }

    /// Users whose data the caller may see; `None` means unrestricted
    async fn visible_users(&self, ctx: &ActorContext) -> Result<Option<HashSet<String>>> {
        if ctx.is_master_admin() {
            return Ok(None);
        }
        let users = self
            .store
            .list_profiles()
            .await?
            .into_iter()
            .filter(|profile| profile.organization_id == ctx.organization_id)
            .map(|profile| profile.id)
            .collect();
        Ok(Some(users))
    }

    /// Reject callers acting on a subject from another organization
    ///
    /// Subjects missing from the directory are not scoped.
    async fn require_subject_in_scope(&self, ctx: &ActorContext, user_id: &str) -> Result<()> {
        match self.organization_of(user_id).await? {
            Some(org) => ctx.require_organization(&org),
            None => Ok(()),
        }
    }
}

/// JSON snapshot of a row for audit before/after fields
fn snapshot<T: Serialize>(row: &T) -> Result<Value> {
    Ok(serde_json::to_value(row)?)
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::Error::Validation(format!(
            "{} must not be blank",
            field
        )));
    }
    Ok(())
}
