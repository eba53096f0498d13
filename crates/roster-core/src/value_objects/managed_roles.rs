//! Managed role flags - the roles this system keeps in sync on the platform
//!
//! Each flag marks something a tracked member is still missing. The flags are
//! recomputed on every reconciliation pass and never cached; which platform
//! role backs each flag is configured in [`ManagedRoleIds`].

use bitflags::bitflags;
use serde::Deserialize;

use super::Snowflake;

bitflags! {
    /// Flags for the three system-managed roles
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ManagedRoles: u8 {
        /// Member has not registered an in-game name
        const MISSING_NAME         = 1 << 0;
        /// Member holds no class role
        const MISSING_CLASS        = 1 << 1;
        /// Member has no open review conversation
        const MISSING_CONVERSATION = 1 << 2;
    }
}

impl ManagedRoles {
    /// Build the desired flag set from the three "missing" booleans
    #[must_use]
    pub fn from_missing(name: bool, class: bool, conversation: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::MISSING_NAME, name);
        flags.set(Self::MISSING_CLASS, class);
        flags.set(Self::MISSING_CONVERSATION, conversation);
        flags
    }
}

/// Platform role ids backing each managed flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ManagedRoleIds {
    pub missing_name: Snowflake,
    pub missing_class: Snowflake,
    pub missing_conversation: Snowflake,
}

impl ManagedRoleIds {
    /// Pairs of (flag, role id) in a fixed order
    pub fn pairs(&self) -> [(ManagedRoles, Snowflake); 3] {
        [
            (ManagedRoles::MISSING_NAME, self.missing_name),
            (ManagedRoles::MISSING_CLASS, self.missing_class),
            (ManagedRoles::MISSING_CONVERSATION, self.missing_conversation),
        ]
    }

    /// All three role ids
    pub fn all(&self) -> [Snowflake; 3] {
        [self.missing_name, self.missing_class, self.missing_conversation]
    }

    /// Check whether a role id is one of the managed roles
    #[inline]
    pub fn contains(&self, role_id: Snowflake) -> bool {
        self.all().contains(&role_id)
    }

    /// Read which managed flags a role set currently carries
    pub fn observed<'a, I>(&self, roles: I) -> ManagedRoles
    where
        I: IntoIterator<Item = &'a Snowflake>,
    {
        let roles: Vec<&Snowflake> = roles.into_iter().collect();
        self.pairs()
            .into_iter()
            .filter(|(_, id)| roles.contains(&id))
            .fold(ManagedRoles::empty(), |acc, (flag, _)| acc | flag)
    }

    /// Role id backing a single flag
    pub fn role_for(&self, flag: ManagedRoles) -> Option<Snowflake> {
        self.pairs()
            .into_iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, id)| id)
    }
}
