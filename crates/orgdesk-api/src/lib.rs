//! OrgDesk HTTP API
//!
//! Axum routes over the permission and layout services. Callers are
//! identified by the `x-user-id` header set by the upstream auth gateway.

pub mod actor;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use actor::{Actor, USER_ID_HEADER};
pub use error::{ApiError, ApiResult};
pub use routes::app;
pub use server::ApiServer;
pub use state::AppState;
