//! Access request data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    Expired,
    Cancelled,
}

impl RequestStatus {
    /// Only pending requests move, and only out of pending
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        *self == RequestStatus::Pending && next != RequestStatus::Pending
    }

    pub fn is_pending(&self) -> bool {
        *self == RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Denied => write!(f, "denied"),
            RequestStatus::Expired => write!(f, "expired"),
            RequestStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Review queue priority, `Urgent` highest
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl std::fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestPriority::Low => write!(f, "low"),
            RequestPriority::Normal => write!(f, "normal"),
            RequestPriority::High => write!(f, "high"),
            RequestPriority::Urgent => write!(f, "urgent"),
        }
    }
}

/// A user's request for access to one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAccessRequest {
    pub id: String,
    pub user_id: String,
    pub tool_id: String,
    pub status: RequestStatus,
    pub request_reason: String,
    pub business_justification: String,
    #[serde(default)]
    pub requested_duration_days: Option<u32>,
    #[serde(default)]
    pub is_temporary: bool,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_comment: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: RequestPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ToolAccessRequest {
    /// Create a pending request on behalf of `user_id`
    pub fn pending(user_id: impl Into<String>, new: NewAccessRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            tool_id: new.tool_id,
            status: RequestStatus::Pending,
            request_reason: new.request_reason,
            business_justification: new.business_justification,
            requested_duration_days: new.requested_duration_days,
            is_temporary: new.is_temporary,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
            expires_at: None,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this request moved to `status`, stamped with review metadata
    pub fn transitioned(
        &self,
        status: RequestStatus,
        reviewed_by: Option<&str>,
        review_comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            reviewed_by: reviewed_by.map(str::to_string),
            reviewed_at: Some(now),
            review_comment: review_comment.map(str::to_string),
            updated_at: now,
            ..self.clone()
        }
    }
}

/// Payload for submitting a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccessRequest {
    pub tool_id: String,
    pub request_reason: String,
    pub business_justification: String,
    #[serde(default)]
    pub requested_duration_days: Option<u32>,
    #[serde(default)]
    pub is_temporary: bool,
    #[serde(default)]
    pub priority: RequestPriority,
}

impl NewAccessRequest {
    /// A permanent request at normal priority
    pub fn new(
        tool_id: impl Into<String>,
        request_reason: impl Into<String>,
        business_justification: impl Into<String>,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            request_reason: request_reason.into(),
            business_justification: business_justification.into(),
            requested_duration_days: None,
            is_temporary: false,
            priority: RequestPriority::Normal,
        }
    }

    /// Make the request temporary for `days`
    pub fn temporary(mut self, days: u32) -> Self {
        self.is_temporary = true;
        self.requested_duration_days = Some(days);
        self
    }

    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Review queue filter; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub priority: Option<RequestPriority>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tool_id: Option<String>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: RequestPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }

    pub fn matches(&self, request: &ToolAccessRequest) -> bool {
        self.status.map_or(true, |status| request.status == status)
            && self.priority.map_or(true, |priority| request.priority == priority)
            && self
                .user_id
                .as_ref()
                .map_or(true, |user_id| &request.user_id == user_id)
            && self
                .tool_id
                .as_ref()
                .map_or(true, |tool_id| &request.tool_id == tool_id)
    }
}

/// Sort for the review queue: urgent first, then oldest first
pub fn sort_queue(requests: &mut [ToolAccessRequest]) {
    requests.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Pending request counts per priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub total: usize,
    pub urgent: usize,
    pub high: usize,
    pub normal: usize,
    pub low: usize,
}

impl QueueSummary {
    /// Count the pending requests among `requests`
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a ToolAccessRequest>) -> Self {
        let mut summary = Self::default();
        for request in requests.into_iter().filter(|r| r.status.is_pending()) {
            summary.total += 1;
            match request.priority {
                RequestPriority::Urgent => summary.urgent += 1,
                RequestPriority::High => summary.high += 1,
                RequestPriority::Normal => summary.normal += 1,
                RequestPriority::Low => summary.low += 1,
            }
        }
        summary
    }
}
