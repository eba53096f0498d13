//! Platform member - a community member as the platform reports it

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A member of the community as last seen on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMember {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<Snowflake>,
    #[serde(default)]
    pub bot: bool,
}

impl PlatformMember {
    /// Create a new PlatformMember with no nickname and no roles
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            nickname: None,
            role_ids: Vec::new(),
            bot: false,
        }
    }

    /// Get display name (nickname if set, otherwise username)
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Check if member holds any of the given roles
    pub fn has_any_role(&self, role_ids: &[Snowflake]) -> bool {
        role_ids.iter().any(|id| self.has_role(*id))
    }

    /// Builder-style helper to set roles
    pub fn with_roles(mut self, role_ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.role_ids = role_ids.into_iter().collect();
        self
    }
}
