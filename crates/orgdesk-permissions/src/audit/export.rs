//! CSV export of the audit trail

use std::collections::HashMap;

use crate::directory::{Tool, UserProfile};
use crate::error::{Error, Result};

use super::models::PermissionAuditEntry;

/// Column headers of the export
pub const CSV_HEADER: [&str; 8] = [
    "Date/Time",
    "User Email",
    "User Name",
    "Tool Name",
    "Action Type",
    "Performed By",
    "Reason",
    "IP Address",
];

/// Timestamp format used in the export (UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render entries as CSV, resolving names through the directory and catalog
///
/// Unknown users render empty email and name, unknown tools render their id,
/// and unknown performers render their id.
pub fn export_csv(
    entries: &[PermissionAuditEntry],
    profiles: &[UserProfile],
    tools: &[Tool],
) -> Result<String> {
    let profiles: HashMap<&str, &UserProfile> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();
    let tools: HashMap<&str, &Tool> = tools.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for entry in entries {
        let subject = profiles.get(entry.user_id.as_str());
        let tool_name = entry
            .tool_id
            .as_deref()
            .map(|id| tools.get(id).map_or(id, |tool| tool.name.as_str()))
            .unwrap_or_default();
        let performed_by = entry
            .performed_by
            .as_deref()
            .map(|id| profiles.get(id).map_or(id, |p| p.email.as_str()))
            .unwrap_or_default();
        let timestamp = entry.created_at.format(TIMESTAMP_FORMAT).to_string();

        writer.write_record([
            timestamp.as_str(),
            subject.map_or("", |p| p.email.as_str()),
            subject.map_or("", |p| p.full_name.as_str()),
            tool_name,
            entry.action_type.as_str(),
            performed_by,
            entry.reason.as_deref().unwrap_or_default(),
            entry.ip_address.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("CSV output is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditActionType;
    use crate::permission::PermissionLevel;
    use chrono::{TimeZone, Utc};

    fn fixtures() -> (Vec<UserProfile>, Vec<Tool>) {
        (
            vec![
                UserProfile::new("u1", "org-1", "jane@example.com", "Doe, Jane", PermissionLevel::Employee),
                UserProfile::new("a1", "org-1", "admin@example.com", "Admin", PermissionLevel::Admin),
            ],
            vec![Tool::new("crm", "CRM \"Pro\"")],
        )
    }

    #[test]
    fn test_export_header_and_row() {
        let (profiles, tools) = fixtures();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 5).unwrap();
        let entry = PermissionAuditEntry::new("u1", AuditActionType::Approve, at)
            .with_tool("crm")
            .with_reason("Needed for Q4, reporting")
            .with_metadata("k", "v");
        let entry = PermissionAuditEntry {
            performed_by: Some("a1".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
            ..entry
        };

        let csv = export_csv(&[entry], &profiles, &tools).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date/Time,User Email,User Name,Tool Name,Action Type,Performed By,Reason,IP Address"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-01-15 09:30:05,jane@example.com,\"Doe, Jane\",\"CRM \"\"Pro\"\"\",approve,admin@example.com,\"Needed for Q4, reporting\",10.0.0.1"
        );
    }

    #[test]
    fn test_export_fallbacks() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let entry = PermissionAuditEntry {
            performed_by: Some("ghost".to_string()),
            ..PermissionAuditEntry::new("nobody", AuditActionType::CheckDenied, at).with_tool("unlisted")
        };

        let csv = export_csv(&[entry], &[], &[]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "2024-02-01 00:00:00,,,unlisted,check_denied,ghost,,");
    }

    #[test]
    fn test_export_empty() {
        let csv = export_csv(&[], &[], &[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
