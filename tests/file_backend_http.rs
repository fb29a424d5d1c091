//! Server state built from configuration with the file backend

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use orgdesk_api::{app, AppState, USER_ID_HEADER};
use orgdesk_config::{AppConfig, StorageBackend};
use orgdesk_events::Table;
use orgdesk_layout::{FileLayoutStore, LayoutStore, SectionKey, SectionKind};
use orgdesk_permissions::{
    FilePermissionStore, PermissionLevel, PermissionStore, Tool, UserProfile,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn file_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::File;
    config.storage.data_dir = dir.path().to_path_buf();
    config
}

async fn call(state: &AppState, method: Method, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_grant_and_reorder_persist_across_restarts() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    {
        let state = AppState::from_config(&config).await.unwrap();
        let mut events = state.bus.subscribe();
        for profile in [
            UserProfile::new("ada", "acme", "ada@acme.test", "Ada Admin", PermissionLevel::Admin),
            UserProfile::new("uma", "acme", "uma@acme.test", "Uma User", PermissionLevel::Employee),
        ] {
            state.permissions.upsert_profile(profile).await.unwrap();
        }
        state
            .permissions
            .upsert_tool(Tool::new("crm-export", "CRM Export"))
            .await
            .unwrap();

        let (status, summary) = call(
            &state,
            Method::POST,
            "/api/v1/permissions/grant",
            "ada",
            json!({"user_ids": ["uma"], "tool_ids": ["crm-export"], "reason": "Sales ops"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary, json!({"granted": 1, "failed": 0}));

        for title in ["Leads", "Pipeline"] {
            let (status, _) = call(
                &state,
                Method::POST,
                "/api/v1/departments/sales/tools",
                "ada",
                json!({"title": title, "kind": "tool", "url": "https://crm.acme.test"}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let mut tables = Vec::new();
        while let Ok(event) = events.try_recv() {
            tables.push(event.table);
        }
        assert!(tables.contains(&Table::UserPermissions));
        assert!(tables.contains(&Table::DepartmentTools));
    }

    let permissions = FilePermissionStore::in_dir(dir.path()).unwrap();
    let row = permissions
        .find_permission("uma", "crm-export")
        .await
        .unwrap()
        .unwrap();
    assert!(row.granted);
    assert_eq!(row.granted_by, "ada");
    assert_eq!(permissions.list_templates().await.unwrap().len(), 5);

    let layout = FileLayoutStore::in_dir(dir.path()).unwrap();
    let key = SectionKey {
        organization_id: "acme",
        department_id: "sales",
        kind: SectionKind::Tools,
    };
    let titles: Vec<_> = layout
        .list_section(key)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Leads", "Pipeline"]);

    // restart: seeding is idempotent and prior data is visible
    let state = AppState::from_config(&config).await.unwrap();
    assert_eq!(state.permissions.list_templates().await.unwrap().len(), 5);
    let (status, listed) = call(
        &state,
        Method::GET,
        "/api/v1/users/uma/permissions",
        "uma",
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
