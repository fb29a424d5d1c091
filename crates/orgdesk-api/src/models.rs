//! Request and response bodies that are not domain types

use chrono::NaiveDate;
use orgdesk_permissions::{AuditActionType, AuditFilter, Pagination, ReviewCommand};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the server started
    pub uptime: u64,
}

/// Body of `POST /access-requests/bulk-review`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkReviewRequest {
    pub request_ids: Vec<String>,
    #[serde(flatten)]
    pub command: ReviewCommand,
}

/// Query of `GET /access/check`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckQuery {
    pub tool_id: String,
    /// Defaults to the caller
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevokeRequest {
    pub user_id: String,
    pub tool_id: String,
    pub reason: String,
}

/// Query of the audit endpoints; page fields are ignored by the export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tool_id: Option<String>,
    #[serde(default)]
    pub action_type: Option<AuditActionType>,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub show_denials_only: bool,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl AuditQuery {
    pub fn filter(&self) -> AuditFilter {
        AuditFilter {
            user_id: self.user_id.clone(),
            tool_id: self.tool_id.clone(),
            action_type: self.action_type,
            performed_by: self.performed_by.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            show_denials_only: self.show_denials_only,
        }
    }

    /// Requested page, falling back to `default` for missing fields
    pub fn pagination(&self, default: Pagination) -> Pagination {
        Pagination::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }
}

/// Body of `POST /departments/:department_id/:section/reorder`
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub moved_id: String,
    pub target_id: String,
}
