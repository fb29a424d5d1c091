//! Integration tests for the permission services over the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use orgdesk_events::{ChangeBus, Table};
use orgdesk_permissions::{
    ActorContext, AuditActionType, AuditFilter, BulkGrant, ChangeSet, CheckLogging, Error,
    InMemoryPermissionStore, Mutation, NewAccessRequest, NewTemplate, PermissionAuditEntry,
    PermissionLevel, PermissionService, PermissionSettings, PermissionSource, PermissionStore,
    PermissionTemplate, RequestFilter, RequestPriority, RequestStatus, ReviewCommand, StoreError,
    StoreResult, Tool, ToolAccessRequest, ToolPermissions, UserPermission, UserProfile,
};

struct Fixture {
    service: PermissionService,
    store: Arc<InMemoryPermissionStore>,
    admin: ActorContext,
    employee: ActorContext,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryPermissionStore::new());
    let service = PermissionService::new(store.clone(), ChangeBus::new(), PermissionSettings::default());

    for profile in [
        UserProfile::new("admin-1", "org-1", "admin@acme.test", "Ada Admin", PermissionLevel::Admin),
        UserProfile::new("emp-1", "org-1", "emp@acme.test", "Eli Employee", PermissionLevel::Employee),
        UserProfile::new("emp-2", "org-2", "other@globex.test", "Olga Other", PermissionLevel::Employee),
    ] {
        service.upsert_profile(profile).await.unwrap();
    }
    service.upsert_tool(Tool::new("report-writer", "AI Report Writer")).await.unwrap();
    service.upsert_tool(Tool::new("crm-export", "CRM Export")).await.unwrap();
    service.seed_system_templates().await.unwrap();

    Fixture {
        service,
        store,
        admin: ActorContext::new("admin-1", "org-1", PermissionLevel::Admin),
        employee: ActorContext::new("emp-1", "org-1", PermissionLevel::Employee),
    }
}

async fn submit(f: &Fixture, tool: &str) -> ToolAccessRequest {
    f.service
        .submit_request(&f.employee, NewAccessRequest::new(tool, "Quarterly reports", "Finance needs it"))
        .await
        .unwrap()
}

fn count_actions(entries: &[PermissionAuditEntry], action: AuditActionType) -> usize {
    entries.iter().filter(|e| e.action_type == action).count()
}

#[tokio::test]
async fn test_approve_creates_grant_and_one_audit_entry() {
    let f = fixture().await;
    let request = f
        .service
        .submit_request(
            &f.employee,
            NewAccessRequest::new("report-writer", "Quarterly reports", "Finance needs it")
                .temporary(30)
                .with_priority(RequestPriority::Urgent),
        )
        .await
        .unwrap();

    let outcome = f
        .service
        .review(&f.admin, &request.id, &ReviewCommand::approve("Needed for Q4 reporting work").for_days(14))
        .await
        .unwrap();
    assert!(outcome.success, "{:?}", outcome.error);

    let stored = f.store.get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
    assert_eq!(stored.reviewed_by.as_deref(), Some("admin-1"));

    let permission = f.store.find_permission("emp-1", "report-writer").await.unwrap().unwrap();
    assert!(permission.granted);
    assert!(permission.is_temporary);
    let expected = Utc::now() + Duration::days(14);
    let drift = (permission.expires_at.unwrap() - expected).num_seconds().abs();
    assert!(drift < 60);

    let entries = f.store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::Approve), 1);
    let approve = entries.iter().find(|e| e.action_type == AuditActionType::Approve).unwrap();
    assert!(approve.permission_before.is_none());
    assert_eq!(approve.permission_after.as_ref().unwrap()["granted"], true);
}

#[tokio::test]
async fn test_deny_touches_no_permission() {
    let f = fixture().await;
    let request = submit(&f, "crm-export").await;

    let outcome = f
        .service
        .review(&f.admin, &request.id, &ReviewCommand::deny("Not justified for this role"))
        .await
        .unwrap();
    assert!(outcome.success);

    assert_eq!(
        f.store.get_request(&request.id).await.unwrap().unwrap().status,
        RequestStatus::Denied
    );
    assert!(f.store.find_permission("emp-1", "crm-export").await.unwrap().is_none());
    let entries = f.store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::Deny), 1);
}

#[tokio::test]
async fn test_review_of_non_pending_request_has_no_side_effects() {
    let f = fixture().await;
    let request = submit(&f, "crm-export").await;
    let command = ReviewCommand::approve("Approved for the migration");
    assert!(f.service.review(&f.admin, &request.id, &command).await.unwrap().success);

    let before = f.store.snapshot();
    let outcome = f.service.review(&f.admin, &request.id, &command).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("already approved"));
    assert_eq!(f.store.snapshot(), before);
}

#[tokio::test]
async fn test_review_rejections() {
    let f = fixture().await;
    let request = submit(&f, "crm-export").await;

    let short = f.service.review(&f.admin, &request.id, &ReviewCommand::approve("ok")).await.unwrap();
    assert!(!short.success);

    let not_admin = f
        .service
        .review(&f.employee, &request.id, &ReviewCommand::approve("Self approval attempt"))
        .await
        .unwrap();
    assert!(!not_admin.success);

    let missing = f
        .service
        .review(&f.admin, "no-such-request", &ReviewCommand::approve("Approved for the migration"))
        .await
        .unwrap();
    assert!(!missing.success);

    let foreign_admin = ActorContext::new("admin-9", "org-2", PermissionLevel::Admin);
    let foreign = f
        .service
        .review(&foreign_admin, &request.id, &ReviewCommand::approve("Approved for the migration"))
        .await
        .unwrap();
    assert!(!foreign.success);

    assert_eq!(
        f.store.get_request(&request.id).await.unwrap().unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn test_concurrent_reviews_grant_once() {
    let f = fixture().await;
    let request = submit(&f, "report-writer").await;
    let approve = ReviewCommand::approve("Approved by reviewer one");
    let deny = ReviewCommand::deny("Denied by reviewer two");

    let (a, b) = tokio::join!(
        f.service.review(&f.admin, &request.id, &approve),
        f.service.review(&f.admin, &request.id, &deny),
    );
    let successes = [a.unwrap(), b.unwrap()].iter().filter(|o| o.success).count();
    assert_eq!(successes, 1);

    let entries = f.store.audit_entries().await.unwrap();
    let decisions = count_actions(&entries, AuditActionType::Approve) + count_actions(&entries, AuditActionType::Deny);
    assert_eq!(decisions, 1);
}

#[tokio::test]
async fn test_bulk_review_isolates_failures() {
    let f = fixture().await;
    let first = submit(&f, "report-writer").await;
    let second = submit(&f, "crm-export").await;
    let ids = vec![first.id.clone(), second.id.clone(), first.id.clone(), "missing".to_string()];

    let summary = f
        .service
        .bulk_review(&f.admin, &ids, &ReviewCommand::approve("Bulk approval for onboarding"))
        .await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(
        serde_json::to_value(summary).unwrap(),
        serde_json::json!({"approved": 2, "failed": 2})
    );
}

#[tokio::test]
async fn test_bulk_review_validates_up_front() {
    let f = fixture().await;
    let request = submit(&f, "report-writer").await;

    let summary = f
        .service
        .bulk_review(&f.admin, &[request.id.clone()], &ReviewCommand::deny("too short"))
        .await;
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        f.store.get_request(&request.id).await.unwrap().unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn test_submit_validation_and_duplicates() {
    let f = fixture().await;

    let unknown_tool = f
        .service
        .submit_request(&f.employee, NewAccessRequest::new("nope", "reason", "justification"))
        .await;
    assert!(matches!(unknown_tool, Err(Error::Validation(_))));

    let blank = f
        .service
        .submit_request(&f.employee, NewAccessRequest::new("crm-export", "  ", "justification"))
        .await;
    assert!(matches!(blank, Err(Error::Validation(_))));

    let too_long = f
        .service
        .submit_request(&f.employee, NewAccessRequest::new("crm-export", "r", "j").temporary(400))
        .await;
    assert!(matches!(too_long, Err(Error::Validation(_))));

    submit(&f, "crm-export").await;
    let duplicate = f
        .service
        .submit_request(&f.employee, NewAccessRequest::new("crm-export", "again", "again"))
        .await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_cancel_request() {
    let f = fixture().await;
    let request = submit(&f, "crm-export").await;

    let other = ActorContext::new("emp-3", "org-1", PermissionLevel::Employee);
    assert!(matches!(
        f.service.cancel_request(&other, &request.id).await,
        Err(Error::Unauthorized(_))
    ));

    let cancelled = f.service.cancel_request(&f.employee, &request.id).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    let entries = f.store.audit_entries().await.unwrap();
    let cancel_entry = entries
        .iter()
        .find(|e| e.metadata["transition"] == "cancelled")
        .unwrap();
    assert_eq!(cancel_entry.action_type, AuditActionType::Request);

    assert!(matches!(
        f.service.cancel_request(&f.employee, &request.id).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_list_requests_scoping_and_order() {
    let f = fixture().await;
    submit(&f, "crm-export").await;
    f.service
        .submit_request(
            &f.employee,
            NewAccessRequest::new("report-writer", "Board deck", "CFO asked").with_priority(RequestPriority::Urgent),
        )
        .await
        .unwrap();
    let outsider = ActorContext::new("emp-2", "org-2", PermissionLevel::Employee);
    f.service
        .submit_request(&outsider, NewAccessRequest::new("crm-export", "r", "j"))
        .await
        .unwrap();

    let queue = f.service.list_requests(&f.admin, RequestFilter::new()).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].priority, RequestPriority::Urgent);

    let own = f.service.list_requests(&outsider, RequestFilter::new()).await.unwrap();
    assert_eq!(own.len(), 1);
    assert!(matches!(
        f.service.list_requests(&outsider, RequestFilter::new().with_user("emp-1")).await,
        Err(Error::Unauthorized(_))
    ));

    let summary = f.service.queue_summary(&f.admin).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.urgent, 1);
}

#[tokio::test]
async fn test_check_access_resolution_and_logging() {
    let f = fixture().await;

    let denied = f
        .service
        .check_access(&f.employee, "emp-1", "crm-export", CheckLogging::BestEffort)
        .await
        .unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.source, PermissionSource::Denied);

    f.service
        .create_template(
            &f.admin,
            NewTemplate {
                name: "Sales staff".to_string(),
                description: String::new(),
                permission_level: PermissionLevel::Employee,
                tool_permissions: ToolPermissions::allowing(["crm-*"]),
            },
        )
        .await
        .unwrap();
    let allowed = f
        .service
        .check_access(&f.admin, "emp-1", "crm-export", CheckLogging::None)
        .await
        .unwrap();
    assert!(allowed.allowed);
    assert_eq!(allowed.source, PermissionSource::Template);

    let entries = f.store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::CheckDenied), 1);
    assert_eq!(count_actions(&entries, AuditActionType::CheckAllowed), 0);

    assert!(matches!(
        f.service
            .check_access(&f.employee, "admin-1", "crm-export", CheckLogging::None)
            .await,
        Err(Error::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_revocation_overrides_template() {
    let f = fixture().await;
    f.service
        .grant_permissions(
            &f.admin,
            BulkGrant {
                user_ids: vec!["emp-1".to_string()],
                tool_ids: vec!["crm-export".to_string(), "missing-tool".to_string()],
                expires_at: None,
                reason: Some("onboarding".to_string()),
            },
        )
        .await
        .map(|summary| {
            assert_eq!(summary.granted, 1);
            assert_eq!(summary.failed, 1);
        })
        .unwrap();

    f.service
        .revoke_permission(&f.admin, "emp-1", "crm-export", "Left the sales team")
        .await
        .unwrap();
    let result = f
        .service
        .check_access(&f.admin, "emp-1", "crm-export", CheckLogging::None)
        .await
        .unwrap();
    assert!(!result.allowed);
    assert_eq!(result.source, PermissionSource::Override);

    assert!(matches!(
        f.service.revoke_permission(&f.admin, "emp-1", "report-writer", "never granted").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_system_templates_are_immutable() {
    let f = fixture().await;
    let templates = f.service.list_templates().await.unwrap();
    let system = templates.iter().find(|t| t.is_system_template).unwrap();

    assert!(matches!(
        f.service.delete_template(&f.admin, &system.id).await,
        Err(Error::ImmutableTemplate(_))
    ));
    assert_eq!(f.service.seed_system_templates().await.unwrap(), 0);

    let overlapping = f
        .service
        .create_template(
            &f.admin,
            NewTemplate {
                name: "Broken".to_string(),
                description: String::new(),
                permission_level: PermissionLevel::Viewer,
                tool_permissions: ToolPermissions::allowing(["crm-export"]).denying(["crm-export"]),
            },
        )
        .await;
    assert!(matches!(overlapping, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_sweep_expires_lapsed_rows_and_stale_requests() {
    let f = fixture().await;
    let now = Utc::now();
    let lapsed = UserPermission::granted("emp-1", "crm-export", "admin-1", now - Duration::days(10))
        .expiring_at(Some(now - Duration::days(1)));
    let mut stale = ToolAccessRequest::pending(
        "emp-1",
        NewAccessRequest::new("report-writer", "r", "j"),
        now - Duration::days(45),
    );
    stale.updated_at = stale.created_at;
    f.store
        .apply(vec![Mutation::UpsertPermission(lapsed), Mutation::InsertRequest(stale.clone())])
        .await
        .unwrap();

    let report = f.service.sweep_expired(&ActorContext::system(), now).await.unwrap();
    assert_eq!(report.expired_permissions, 1);
    assert_eq!(report.expired_requests, 1);

    assert!(!f.store.find_permission("emp-1", "crm-export").await.unwrap().unwrap().granted);
    assert_eq!(
        f.store.get_request(&stale.id).await.unwrap().unwrap().status,
        RequestStatus::Expired
    );
    let entries = f.store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::Expire), 2);

    let again = f.service.sweep_expired(&ActorContext::system(), now).await.unwrap();
    assert_eq!(again.expired_permissions + again.expired_requests, 0);
}

#[tokio::test]
async fn test_audit_reads_are_admin_only_and_scoped() {
    let f = fixture().await;
    submit(&f, "crm-export").await;
    let outsider = ActorContext::new("emp-2", "org-2", PermissionLevel::Employee);
    f.service
        .submit_request(&outsider, NewAccessRequest::new("crm-export", "r", "j"))
        .await
        .unwrap();

    assert!(matches!(
        f.service
            .fetch_audit_trail(&f.employee, &AuditFilter::new(), f.service.default_pagination())
            .await,
        Err(Error::Unauthorized(_))
    ));

    let page = f
        .service
        .fetch_audit_trail(&f.admin, &AuditFilter::new(), f.service.default_pagination())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.entries[0].user_id, "emp-1");
}

#[tokio::test]
async fn test_events_published_after_commit() {
    let f = fixture().await;
    let mut events = f.service.bus().subscribe();
    let request = submit(&f, "crm-export").await;

    let first = events.recv().await.unwrap();
    assert_eq!(first.table, Table::ToolAccessRequests);
    assert_eq!(first.row_id, request.id);
    assert_eq!(first.organization_id.as_deref(), Some("org-1"));
    assert_eq!(events.recv().await.unwrap().table, Table::PermissionAuditTrail);
}

/// Store that refuses audit appends, for best-effort logging
struct AuditRejectingStore {
    inner: InMemoryPermissionStore,
}

#[async_trait]
impl PermissionStore for AuditRejectingStore {
    async fn apply(&self, changes: ChangeSet) -> StoreResult<()> {
        if changes.iter().any(|m| matches!(m, Mutation::AppendAudit(_))) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.apply(changes).await
    }
    async fn get_request(&self, id: &str) -> StoreResult<Option<ToolAccessRequest>> {
        self.inner.get_request(id).await
    }
    async fn list_requests(&self) -> StoreResult<Vec<ToolAccessRequest>> {
        self.inner.list_requests().await
    }
    async fn find_permission(&self, user_id: &str, tool_id: &str) -> StoreResult<Option<UserPermission>> {
        self.inner.find_permission(user_id, tool_id).await
    }
    async fn list_permissions(&self, user_id: Option<&str>) -> StoreResult<Vec<UserPermission>> {
        self.inner.list_permissions(user_id).await
    }
    async fn list_templates(&self) -> StoreResult<Vec<PermissionTemplate>> {
        self.inner.list_templates().await
    }
    async fn get_template(&self, id: &str) -> StoreResult<Option<PermissionTemplate>> {
        self.inner.get_template(id).await
    }
    async fn audit_entries(&self) -> StoreResult<Vec<PermissionAuditEntry>> {
        self.inner.audit_entries().await
    }
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.inner.get_profile(user_id).await
    }
    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        self.inner.list_profiles().await
    }
    async fn upsert_profile(&self, profile: UserProfile) -> StoreResult<()> {
        self.inner.upsert_profile(profile).await
    }
    async fn get_tool(&self, tool_id: &str) -> StoreResult<Option<Tool>> {
        self.inner.get_tool(tool_id).await
    }
    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        self.inner.list_tools().await
    }
    async fn upsert_tool(&self, tool: Tool) -> StoreResult<()> {
        self.inner.upsert_tool(tool).await
    }
}

#[tokio::test]
async fn test_check_logging_failure_is_swallowed() {
    let store = Arc::new(AuditRejectingStore {
        inner: InMemoryPermissionStore::new(),
    });
    let service = PermissionService::new(store.clone(), ChangeBus::new(), PermissionSettings::default());
    service
        .upsert_profile(UserProfile::new("m1", "org-1", "m@x.test", "M", PermissionLevel::MasterAdmin))
        .await
        .unwrap();
    let ctx = ActorContext::new("m1", "org-1", PermissionLevel::MasterAdmin);

    let result = service
        .check_access(&ctx, "m1", "anything", CheckLogging::BestEffort)
        .await
        .unwrap();
    assert!(result.allowed);
    assert_eq!(result.source, PermissionSource::Role);
    assert!(store.audit_entries().await.unwrap().is_empty());
}

/// Store that commits another writer's change set right after the service
/// reads a permission row
struct InterleavingStore {
    inner: InMemoryPermissionStore,
    after_read: Mutex<Option<ChangeSet>>,
}

impl InterleavingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryPermissionStore::new(),
            after_read: Mutex::new(None),
        }
    }

    fn interleave(&self, changes: ChangeSet) {
        *self.after_read.lock() = Some(changes);
    }

    async fn run_interleaved(&self) {
        let pending = self.after_read.lock().take();
        if let Some(changes) = pending {
            self.inner.apply(changes).await.unwrap();
        }
    }
}

#[async_trait]
impl PermissionStore for InterleavingStore {
    async fn apply(&self, changes: ChangeSet) -> StoreResult<()> {
        self.inner.apply(changes).await
    }
    async fn get_request(&self, id: &str) -> StoreResult<Option<ToolAccessRequest>> {
        self.inner.get_request(id).await
    }
    async fn list_requests(&self) -> StoreResult<Vec<ToolAccessRequest>> {
        self.inner.list_requests().await
    }
    async fn find_permission(&self, user_id: &str, tool_id: &str) -> StoreResult<Option<UserPermission>> {
        let found = self.inner.find_permission(user_id, tool_id).await;
        self.run_interleaved().await;
        found
    }
    async fn list_permissions(&self, user_id: Option<&str>) -> StoreResult<Vec<UserPermission>> {
        let listed = self.inner.list_permissions(user_id).await;
        self.run_interleaved().await;
        listed
    }
    async fn list_templates(&self) -> StoreResult<Vec<PermissionTemplate>> {
        self.inner.list_templates().await
    }
    async fn get_template(&self, id: &str) -> StoreResult<Option<PermissionTemplate>> {
        self.inner.get_template(id).await
    }
    async fn audit_entries(&self) -> StoreResult<Vec<PermissionAuditEntry>> {
        self.inner.audit_entries().await
    }
    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.inner.get_profile(user_id).await
    }
    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        self.inner.list_profiles().await
    }
    async fn upsert_profile(&self, profile: UserProfile) -> StoreResult<()> {
        self.inner.upsert_profile(profile).await
    }
    async fn get_tool(&self, tool_id: &str) -> StoreResult<Option<Tool>> {
        self.inner.get_tool(tool_id).await
    }
    async fn list_tools(&self) -> StoreResult<Vec<Tool>> {
        self.inner.list_tools().await
    }
    async fn upsert_tool(&self, tool: Tool) -> StoreResult<()> {
        self.inner.upsert_tool(tool).await
    }
}

async fn interleaving_service() -> (PermissionService, Arc<InterleavingStore>) {
    let store = Arc::new(InterleavingStore::new());
    let service = PermissionService::new(store.clone(), ChangeBus::new(), PermissionSettings::default());
    for profile in [
        UserProfile::new("admin-1", "org-1", "admin@acme.test", "Ada Admin", PermissionLevel::Admin),
        UserProfile::new("admin-2", "org-1", "bo@acme.test", "Bo Admin", PermissionLevel::Admin),
        UserProfile::new("emp-1", "org-1", "emp@acme.test", "Eli Employee", PermissionLevel::Employee),
    ] {
        service.upsert_profile(profile).await.unwrap();
    }
    service.upsert_tool(Tool::new("crm-export", "CRM Export")).await.unwrap();
    (service, store)
}

#[tokio::test]
async fn test_sweep_keeps_grant_renewed_after_its_read() {
    let (service, store) = interleaving_service().await;
    let now = Utc::now();
    let lapsed = UserPermission::granted("emp-1", "crm-export", "admin-1", now - Duration::days(10))
        .expiring_at(Some(now - Duration::days(1)));
    store.apply(vec![Mutation::UpsertPermission(lapsed)]).await.unwrap();

    let renewed = UserPermission::granted("emp-1", "crm-export", "admin-2", now);
    store.interleave(vec![Mutation::UpsertPermission(renewed.clone())]);

    let report = service.sweep_expired(&ActorContext::system(), now).await.unwrap();
    assert_eq!(report.expired_permissions, 0);

    let row = store.find_permission("emp-1", "crm-export").await.unwrap().unwrap();
    assert_eq!(row, renewed);
    let entries = store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::Expire), 0);

    let admin = ActorContext::new("admin-1", "org-1", PermissionLevel::Admin);
    let result = service
        .check_access(&admin, "emp-1", "crm-export", CheckLogging::None)
        .await
        .unwrap();
    assert!(result.allowed);
}

#[tokio::test]
async fn test_revoke_conflicts_with_grant_made_after_its_read() {
    let (service, store) = interleaving_service().await;
    let admin = ActorContext::new("admin-1", "org-1", PermissionLevel::Admin);
    let now = Utc::now();
    store
        .apply(vec![Mutation::UpsertPermission(UserPermission::granted(
            "emp-1",
            "crm-export",
            "admin-1",
            now - Duration::days(3),
        ))])
        .await
        .unwrap();

    let renewed = UserPermission::granted("emp-1", "crm-export", "admin-2", now);
    store.interleave(vec![Mutation::UpsertPermission(renewed.clone())]);

    let result = service
        .revoke_permission(&admin, "emp-1", "crm-export", "Left the sales team")
        .await;
    assert!(matches!(
        result,
        Err(Error::Store(StoreError::ConcurrencyConflict(_)))
    ));
    assert_eq!(store.find_permission("emp-1", "crm-export").await.unwrap().unwrap(), renewed);
    let entries = store.audit_entries().await.unwrap();
    assert_eq!(count_actions(&entries, AuditActionType::Revoke), 0);

    // a retry reads the renewed row and records it as the prior state
    service
        .revoke_permission(&admin, "emp-1", "crm-export", "Left the sales team")
        .await
        .unwrap();
    let entries = store.audit_entries().await.unwrap();
    let revoke = entries
        .iter()
        .find(|e| e.action_type == AuditActionType::Revoke)
        .unwrap();
    let before = revoke.permission_before.as_ref().unwrap();
    assert_eq!(before["granted_by"], "admin-2");
    assert_eq!(before["granted"], true);
}
