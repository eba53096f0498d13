//! Conversation container - a review thread opened for one member
//!
//! Review threads carry the member id they belong to as a bracketed suffix
//! on their name, e.g. `Kaelthas review [1309266911703334952]`.

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A review conversation (thread) as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContainer {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
}

impl ConversationContainer {
    /// Create an open container
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            archived: false,
            locked: false,
        }
    }

    /// Member id encoded in the name's `[digits]` suffix
    pub fn member_id(&self) -> Option<Snowflake> {
        member_id_from_name(&self.name)
    }

    /// Check if the container is neither archived nor locked
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.archived && !self.locked
    }
}

/// Parse the member id out of a name ending in `[<digits>]`
pub fn member_id_from_name(name: &str) -> Option<Snowflake> {
    let inner = name.strip_suffix(']')?;
    let start = inner.rfind('[')?;
    Snowflake::parse(&inner[start + 1..]).ok()
}
