//! Audit trail: entries, queries and CSV export

pub mod export;
pub mod models;
pub mod query;

pub use export::{export_csv, CSV_HEADER, TIMESTAMP_FORMAT};
pub use models::{AuditActionType, PermissionAuditEntry};
pub use query::{matching_entries, AuditFilter, AuditPage, Pagination};
