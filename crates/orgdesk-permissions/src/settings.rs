//! Tunables for the permission services

use serde::{Deserialize, Serialize};

/// Limits and switches applied by [`crate::PermissionService`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSettings {
    /// Minimum review comment length, in characters after trimming
    pub min_comment_chars: usize,
    /// Longest duration a temporary request or grant may ask for
    pub max_duration_days: u32,
    /// Pending requests older than this are expired by the sweep
    pub pending_ttl_days: u32,
    /// Audit page size used when the caller gives none
    pub default_page_size: usize,
    /// Upper bound for audit page sizes
    pub max_page_size: usize,
    /// Record `check_allowed` / `check_denied` entries for best-effort checks
    pub log_access_checks: bool,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            min_comment_chars: 10,
            max_duration_days: 365,
            pending_ttl_days: 30,
            default_page_size: 50,
            max_page_size: 500,
            log_access_checks: true,
        }
    }
}
