//! Managed-role reconciler
//!
//! Brings the managed roles a member carries on the platform in line with
//! the flags derived for them. The full delta is computed before any call is
//! made; at most one batched grant and one batched revoke follow. Platform
//! failures are logged and left for the next pass.

use std::sync::Arc;

use roster_core::{ManagedRoleIds, ManagedRoles, MemberPlatform, PlatformMember, Snowflake};
use tracing::{debug, instrument, warn};

/// Managed roles to grant and revoke
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    pub added: Vec<Snowflake>,
    pub removed: Vec<Snowflake>,
}

impl RoleDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Minimal delta between the roles a member holds and the desired flags
pub fn plan(observed: &[Snowflake], desired: ManagedRoles, managed: &ManagedRoleIds) -> RoleDelta {
    let mut delta = RoleDelta::default();
    for (flag, role_id) in managed.pairs() {
        let holds = observed.contains(&role_id);
        let wants = desired.contains(flag);
        if wants && !holds {
            delta.added.push(role_id);
        } else if holds && !wants {
            delta.removed.push(role_id);
        }
    }
    delta
}

#[derive(Clone)]
pub struct Reconciler {
    platform: Arc<dyn MemberPlatform>,
    managed: ManagedRoleIds,
}

impl Reconciler {
    pub fn new(platform: Arc<dyn MemberPlatform>, managed: ManagedRoleIds) -> Self {
        Self { platform, managed }
    }

    /// Apply the desired flags to a member; returns the attempted delta
    #[instrument(skip(self, member), fields(member_id = %member.id, desired = ?desired))]
    pub async fn reconcile(&self, member: &PlatformMember, desired: ManagedRoles) -> RoleDelta {
        let delta = plan(&member.role_ids, desired, &self.managed);
        self.apply(member.id, &delta).await;
        delta
    }

    /// Remove every managed role the member carries
    #[instrument(skip(self, member), fields(member_id = %member.id))]
    pub async fn strip_all(&self, member: &PlatformMember) -> RoleDelta {
        let delta = plan(&member.role_ids, ManagedRoles::empty(), &self.managed);
        self.apply(member.id, &delta).await;
        delta
    }

    async fn apply(&self, member_id: Snowflake, delta: &RoleDelta) {
        if delta.is_empty() {
            return;
        }

        if !delta.added.is_empty() {
            match self.platform.add_roles(member_id, &delta.added).await {
                Ok(()) => debug!(roles = ?delta.added, "Granted managed roles"),
                Err(e) => warn!(error = %e, roles = ?delta.added, "Failed to grant managed roles"),
            }
        }
        if !delta.removed.is_empty() {
            match self.platform.remove_roles(member_id, &delta.removed).await {
                Ok(()) => debug!(roles = ?delta.removed, "Revoked managed roles"),
                Err(e) => {
                    warn!(error = %e, roles = ?delta.removed, "Failed to revoke managed roles")
                }
            }
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("managed", &self.managed)
            .finish()
    }
}
