//! Access requests and their review

pub mod models;
pub mod review;

pub use models::{
    sort_queue, NewAccessRequest, QueueSummary, RequestFilter, RequestPriority, RequestStatus,
    ToolAccessRequest,
};
pub use review::{
    grant_expiry, validate_comment, BulkReviewSummary, ReviewCommand, ReviewDecision,
    ReviewOutcome,
};
