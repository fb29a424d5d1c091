//! Audit trail filtering and pagination

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::{AuditActionType, PermissionAuditEntry};

/// Filter criteria for audit trail queries; all set fields must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Subject user
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tool_id: Option<String>,
    #[serde(default)]
    pub action_type: Option<AuditActionType>,
    #[serde(default)]
    pub performed_by: Option<String>,
    /// First included calendar day (UTC)
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Last included calendar day (UTC)
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Keep only `check_denied`, `deny` and `revoke` entries
    #[serde(default)]
    pub show_denials_only: bool,
}

impl AuditFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }

    pub fn with_action(mut self, action_type: AuditActionType) -> Self {
        self.action_type = Some(action_type);
        self
    }

    pub fn with_performed_by(mut self, performed_by: impl Into<String>) -> Self {
        self.performed_by = Some(performed_by.into());
        self
    }

    /// Restrict to an inclusive range of calendar days
    pub fn between(mut self, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        self.date_from = Some(date_from);
        self.date_to = Some(date_to);
        self
    }

    pub fn denials_only(mut self) -> Self {
        self.show_denials_only = true;
        self
    }

    /// Check if an entry matches this filter
    pub fn matches(&self, entry: &PermissionAuditEntry) -> bool {
        if let Some(ref user_id) = self.user_id {
            if &entry.user_id != user_id {
                return false;
            }
        }

        if let Some(ref tool_id) = self.tool_id {
            if entry.tool_id.as_ref() != Some(tool_id) {
                return false;
            }
        }

        if let Some(action_type) = self.action_type {
            if entry.action_type != action_type {
                return false;
            }
        }

        if let Some(ref performed_by) = self.performed_by {
            if entry.performed_by.as_ref() != Some(performed_by) {
                return false;
            }
        }

        let day = entry.created_at.date_naive();
        if self.date_from.is_some_and(|from| day < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| day > to) {
            return false;
        }

        !self.show_denials_only || entry.action_type.is_denial()
    }
}

/// Page-based pagination, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    pub fn first_page(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    /// Pages below 1 become 1 and the size is clamped to `[1, max_page_size]`
    pub fn normalized(self, max_page_size: usize) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size.max(1)),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of audit entries, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPage {
    pub entries: Vec<PermissionAuditEntry>,
    /// Number of entries matching the filter
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl AuditPage {
    /// Filter, order and slice `entries`
    ///
    /// `pagination` is used as given; normalize it first.
    pub fn execute(
        entries: &[PermissionAuditEntry],
        filter: &AuditFilter,
        pagination: Pagination,
    ) -> Self {
        let filtered = matching_entries(entries, filter);
        let total = filtered.len();

        let entries = filtered
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.page_size)
            .collect();

        Self {
            entries,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.page * self.page_size < self.total
    }
}

/// Every matching entry, newest first; ties keep store order
pub fn matching_entries(
    entries: &[PermissionAuditEntry],
    filter: &AuditFilter,
) -> Vec<PermissionAuditEntry> {
    let mut filtered: Vec<_> = entries
        .iter()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect();
    // sort_by is stable
    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    filtered
}
