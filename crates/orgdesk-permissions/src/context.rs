//! Caller identity passed explicitly to every service call

use serde::{Deserialize, Serialize};

use crate::directory::UserProfile;
use crate::error::{Error, Result};
use crate::permission::PermissionLevel;

/// Identity and request metadata of the caller performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Caller's user id
    pub user_id: String,
    /// Organization the caller acts within
    pub organization_id: String,
    /// Caller's permission level
    pub permission_level: PermissionLevel,
    /// Client IP, recorded on audit entries
    pub ip_address: Option<String>,
    /// Client user agent, recorded on audit entries
    pub user_agent: Option<String>,
}

impl ActorContext {
    /// Create a new actor context
    pub fn new(
        user_id: impl Into<String>,
        organization_id: impl Into<String>,
        permission_level: PermissionLevel,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id: organization_id.into(),
            permission_level,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Build a context for a directory profile
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self::new(
            profile.id.clone(),
            profile.organization_id.clone(),
            profile.permission_level,
        )
    }

    /// Context used by background jobs such as the expiry sweep
    pub fn system() -> Self {
        Self::new("system", "system", PermissionLevel::MasterAdmin)
    }

    /// Attach the client IP address
    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Attach the client user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Whether the caller holds `admin` or above
    pub fn is_admin(&self) -> bool {
        self.permission_level >= PermissionLevel::Admin
    }

    /// Whether the caller operates across organizations
    pub fn is_master_admin(&self) -> bool {
        self.permission_level == PermissionLevel::MasterAdmin
    }

    /// Reject callers below the required level
    pub fn require_level(&self, required: PermissionLevel) -> Result<()> {
        if self.permission_level >= required {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "requires {} or above, caller is {}",
                required, self.permission_level
            )))
        }
    }

    /// Reject callers below `admin`
    pub fn require_admin(&self) -> Result<()> {
        self.require_level(PermissionLevel::Admin)
    }

    /// Whether the caller may act on data owned by `organization_id`
    ///
    /// Master admins operate across organizations.
    pub fn can_access_organization(&self, organization_id: &str) -> bool {
        self.is_master_admin() || self.organization_id == organization_id
    }

    /// Reject access to another organization's data
    pub fn require_organization(&self, organization_id: &str) -> Result<()> {
        if self.can_access_organization(organization_id) {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "organization {} is outside the caller's scope",
                organization_id
            )))
        }
    }

    /// Reject non-admins acting on another user's data
    pub fn require_self_or_admin(&self, user_id: &str) -> Result<()> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized(
                "only admins may act on other users".to_string(),
            ))
        }
    }
}
