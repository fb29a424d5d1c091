//! Review decisions and outcomes

use chrono::{DateTime, Duration, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::request::models::{RequestStatus, ToolAccessRequest};

/// Reviewer's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Denied,
}

impl ReviewDecision {
    /// Status the request moves to
    pub fn status(&self) -> RequestStatus {
        match self {
            ReviewDecision::Approved => RequestStatus::Approved,
            ReviewDecision::Denied => RequestStatus::Denied,
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewDecision::Approved => write!(f, "approved"),
            ReviewDecision::Denied => write!(f, "denied"),
        }
    }
}

/// Inputs of a single review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCommand {
    pub decision: ReviewDecision,
    pub comment: String,
    #[serde(default)]
    pub grant_duration_days: Option<u32>,
}

impl ReviewCommand {
    pub fn approve(comment: impl Into<String>) -> Self {
        Self {
            decision: ReviewDecision::Approved,
            comment: comment.into(),
            grant_duration_days: None,
        }
    }

    pub fn deny(comment: impl Into<String>) -> Self {
        Self {
            decision: ReviewDecision::Denied,
            comment: comment.into(),
            grant_duration_days: None,
        }
    }

    pub fn for_days(mut self, days: u32) -> Self {
        self.grant_duration_days = Some(days);
        self
    }
}

/// Result of a review; business rejections are data, not errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Counts from a bulk review
///
/// Serializes as `{"approved": n, "failed": m}` or `{"denied": n, "failed": m}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReviewSummary {
    pub decision: ReviewDecision,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkReviewSummary {
    pub fn new(decision: ReviewDecision) -> Self {
        Self {
            decision,
            succeeded: 0,
            failed: 0,
        }
    }
}

impl Serialize for BulkReviewSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        let key = match self.decision {
            ReviewDecision::Approved => "approved",
            ReviewDecision::Denied => "denied",
        };
        map.serialize_entry(key, &self.succeeded)?;
        map.serialize_entry("failed", &self.failed)?;
        map.end()
    }
}

/// Expiry of the permission created by approving `request`
///
/// Temporary requests expire after the reviewer's duration, falling back to the
/// requested one; permanent requests never expire. A duration past the
/// representable date range is a validation error.
pub fn grant_expiry(
    request: &ToolAccessRequest,
    grant_duration_days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    if !request.is_temporary {
        return Ok(None);
    }
    let Some(days) = grant_duration_days.or(request.requested_duration_days) else {
        return Ok(None);
    };
    now.checked_add_signed(Duration::days(i64::from(days)))
        .map(Some)
        .ok_or_else(|| Error::Validation(format!("grant duration of {} days is out of range", days)))
}

/// Reject comments shorter than `min_chars` characters once trimmed
pub fn validate_comment(comment: &str, min_chars: usize) -> Result<()> {
    let len = comment.trim().chars().count();
    if len < min_chars {
        return Err(Error::Validation(format!(
            "review comment must be at least {} characters",
            min_chars
        )));
    }
    Ok(())
}
