//! Permissions system for OrgDesk
//!
//! Role-based tool permissions with per-user overrides, reusable templates,
//! an access-request workflow with admin review, and an append-only audit
//! trail with filtered queries and CSV export.
//!
//! Every write is an atomic change set committed through a
//! [`PermissionStore`]; a [`ChangeBus`](orgdesk_events::ChangeBus) announces
//! committed changes.

pub mod audit;
pub mod context;
pub mod directory;
pub mod error;
pub mod glob_matcher;
pub mod permission;
pub mod request;
pub mod service;
pub mod settings;
pub mod storage;

pub use audit::{AuditActionType, AuditFilter, AuditPage, Pagination, PermissionAuditEntry};
pub use context::ActorContext;
pub use directory::{Tool, UserProfile};
pub use error::{Error, Result, StoreError, StoreResult};
pub use glob_matcher::GlobMatcher;
pub use permission::{
    PermissionCheckResult, PermissionChecker, PermissionLevel, PermissionSource,
    PermissionTemplate, ToolPermissions, UserPermission,
};
pub use request::{
    BulkReviewSummary, NewAccessRequest, QueueSummary, RequestFilter, RequestPriority,
    RequestStatus, ReviewCommand, ReviewDecision, ReviewOutcome, ToolAccessRequest,
};
pub use service::{
    BulkGrant, BulkGrantSummary, CheckLogging, NewTemplate, PermissionService, SweepReport,
    TemplateUpdate,
};
pub use settings::PermissionSettings;
pub use storage::{
    ChangeSet, FilePermissionStore, InMemoryPermissionStore, Mutation, PermissionStore,
};
