//! Platform REST wire types and their mapping into domain entities

use serde::{Deserialize, Serialize};

use roster_core::entities::{ConversationContainer, PlatformMember};
use roster_core::value_objects::Snowflake;

/// `user` object nested in a guild member
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// Guild member object
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMember {
    pub user: ApiUser,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

impl From<ApiMember> for PlatformMember {
    fn from(member: ApiMember) -> Self {
        PlatformMember {
            id: member.user.id,
            username: member.user.username,
            nickname: member.nick.or(member.user.global_name),
            role_ids: member.roles,
            bot: member.user.bot,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiThreadMetadata {
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub archive_timestamp: Option<String>,
}

/// Thread channel object
#[derive(Debug, Clone, Deserialize)]
pub struct ApiThread {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub thread_metadata: ApiThreadMetadata,
}

impl From<ApiThread> for ConversationContainer {
    fn from(thread: ApiThread) -> Self {
        ConversationContainer {
            id: thread.id,
            name: thread.name,
            parent_id: thread.parent_id,
            archived: thread.thread_metadata.archived,
            locked: thread.thread_metadata.locked,
        }
    }
}

/// Response of the active and archived thread listings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiThreadList {
    pub threads: Vec<ApiThread>,
    #[serde(default)]
    pub has_more: bool,
}

/// Body of a member role replacement
#[derive(Debug, Serialize)]
pub struct ModifyMemberRoles<'a> {
    pub roles: &'a [Snowflake],
}

/// 429 response body
#[derive(Debug, Deserialize)]
pub struct ApiRateLimit {
    /// Seconds to wait before retrying
    pub retry_after: f64,
}
