//! Community layout - the static role and channel configuration
//!
//! The layout is loaded once at startup and shared read-only. Declaration
//! order matters: class categories and weapon roles are matched in the
//! order they appear.

use serde::Deserialize;

use crate::error::DomainError;
use crate::value_objects::{ManagedRoleIds, Snowflake};

/// A weapon role, declared inside a class category
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeaponRole {
    pub id: Snowflake,
    pub name: String,
}

/// A class category and the weapon roles that place a member in it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassCategory {
    pub name: String,
    pub roles: Vec<WeaponRole>,
}

impl ClassCategory {
    /// Check if any of the given roles belongs to this category
    pub fn matches(&self, role_ids: &[Snowflake]) -> bool {
        self.roles.iter().any(|role| role_ids.contains(&role.id))
    }
}

/// Static configuration of the community being tracked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterLayout {
    /// The platform community (guild) all events must belong to
    pub community_id: Snowflake,
    pub class_categories: Vec<ClassCategory>,
    pub managed_roles: ManagedRoleIds,
    /// Roles allowed to run admin commands
    #[serde(default)]
    pub authorized_roles: Vec<Snowflake>,
    /// Channels whose threads are review conversations
    pub review_channels: Vec<Snowflake>,
}

impl RosterLayout {
    /// Every weapon role, in declaration order
    pub fn weapon_table(&self) -> impl Iterator<Item = &WeaponRole> {
        self.class_categories.iter().flat_map(|c| c.roles.iter())
    }

    /// Check if a role set grants admin command access
    pub fn is_authorized(&self, role_ids: &[Snowflake]) -> bool {
        self.authorized_roles.iter().any(|id| role_ids.contains(id))
    }

    /// Check if a container parent is one of the review channels
    #[inline]
    pub fn is_review_channel(&self, channel_id: Snowflake) -> bool {
        self.review_channels.contains(&channel_id)
    }

    /// Reject layouts that cannot drive reconciliation
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.community_id.is_zero() {
            return Err(DomainError::InvalidLayout(
                "community_id must be set".to_string(),
            ));
        }

        let managed = self.managed_roles.all();
        if managed.iter().any(Snowflake::is_zero)
            || managed[0] == managed[1]
            || managed[1] == managed[2]
            || managed[0] == managed[2]
        {
            return Err(DomainError::InvalidLayout(
                "managed roles must be three distinct non-zero role ids".to_string(),
            ));
        }

        if self.review_channels.is_empty() {
            return Err(DomainError::InvalidLayout(
                "at least one review channel is required".to_string(),
            ));
        }

        for category in &self.class_categories {
            if category.name.trim().is_empty() {
                return Err(DomainError::InvalidLayout(
                    "class category name cannot be empty".to_string(),
                ));
            }
        }

        if let Some(role) = self.weapon_table().find(|r| managed.contains(&r.id)) {
            return Err(DomainError::InvalidLayout(format!(
                "weapon role {} is also a managed role",
                role.id
            )));
        }

        Ok(())
    }
}
