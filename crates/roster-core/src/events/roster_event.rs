//! Roster events - inbound platform notifications that affect the roster
//!
//! Events may arrive out of order, duplicated, or with partial payloads.
//! Handlers never trust event payloads for persisted attributes; they only
//! use them to decide which member to re-reconcile.

use serde::{Deserialize, Serialize};

use crate::entities::{ConversationContainer, PlatformMember};
use crate::value_objects::Snowflake;

/// All inbound roster events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RosterEvent {
    MemberUpdated(MemberUpdatedEvent),
    MemberRemoved(MemberRemovedEvent),
    ConversationCreated(ConversationEvent),
    ConversationUpdated(ConversationEvent),
    ConversationDeleted(ConversationEvent),
}

impl RosterEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MemberUpdated(_) => "MEMBER_UPDATED",
            Self::MemberRemoved(_) => "MEMBER_REMOVED",
            Self::ConversationCreated(_) => "CONVERSATION_CREATED",
            Self::ConversationUpdated(_) => "CONVERSATION_UPDATED",
            Self::ConversationDeleted(_) => "CONVERSATION_DELETED",
        }
    }

    /// Community the event was raised in
    pub fn community_id(&self) -> Snowflake {
        match self {
            Self::MemberUpdated(e) => e.community_id,
            Self::MemberRemoved(e) => e.community_id,
            Self::ConversationCreated(e)
            | Self::ConversationUpdated(e)
            | Self::ConversationDeleted(e) => e.community_id,
        }
    }

    /// Member the event concerns, if it names one
    pub fn member_id(&self) -> Option<Snowflake> {
        match self {
            Self::MemberUpdated(e) => Some(e.member.id),
            Self::MemberRemoved(e) => Some(e.member_id),
            Self::ConversationCreated(e)
            | Self::ConversationUpdated(e)
            | Self::ConversationDeleted(e) => e.container.member_id(),
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

/// A member's roles, nickname, or account changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUpdatedEvent {
    pub community_id: Snowflake,
    /// Roles before the change; absent when the sender did not have them
    #[serde(default)]
    pub old_role_ids: Option<Vec<Snowflake>>,
    pub member: PlatformMember,
}

/// A member left or was removed from the community
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRemovedEvent {
    pub community_id: Snowflake,
    pub member_id: Snowflake,
}

/// A review conversation was created, changed, or deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEvent {
    pub community_id: Snowflake,
    pub container: ConversationContainer,
}
