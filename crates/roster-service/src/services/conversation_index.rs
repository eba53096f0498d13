//! Conversation index
//!
//! Maps member ids to their open review conversation. A container counts
//! only while it is neither archived nor locked and its name ends in a
//! `[<member id>]` suffix. Later-processed containers overwrite earlier ones
//! for the same member.

use dashmap::DashMap;
use roster_core::{ConversationContainer, Snowflake};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct ConversationIndex {
    by_member: DashMap<Snowflake, Snowflake>,
    by_conversation: DashMap<Snowflake, Snowflake>,
}

impl ConversationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents from a full container listing
    pub fn rebuild<'a, I>(&self, containers: I)
    where
        I: IntoIterator<Item = &'a ConversationContainer>,
    {
        self.by_member.clear();
        self.by_conversation.clear();
        for container in containers {
            self.apply(container);
        }
        info!(entries = self.len(), "Conversation index rebuilt");
    }

    /// Whether the member has an open conversation
    pub fn has(&self, member_id: Snowflake) -> bool {
        self.by_member.contains_key(&member_id)
    }

    pub fn conversation_for(&self, member_id: Snowflake) -> Option<Snowflake> {
        self.by_member.get(&member_id).map(|entry| *entry.value())
    }

    pub fn on_create(&self, container: &ConversationContainer) {
        self.apply(container);
    }

    /// Re-evaluate a container after a rename, archive, or lock
    pub fn on_update(&self, container: &ConversationContainer) {
        if container.member_id().is_none() {
            debug!(
                conversation = %container.id,
                name = %container.name,
                "Ignoring unparseable conversation name"
            );
            return;
        }
        self.detach(container.id);
        self.apply(container);
    }

    pub fn on_delete(&self, container: &ConversationContainer) {
        if container.member_id().is_none() {
            debug!(
                conversation = %container.id,
                name = %container.name,
                "Ignoring unparseable conversation name"
            );
            return;
        }
        self.detach(container.id);
    }

    pub fn len(&self) -> usize {
        self.by_member.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }

    fn apply(&self, container: &ConversationContainer) {
        let Some(member_id) = container.member_id() else {
            debug!(
                conversation = %container.id,
                name = %container.name,
                "Ignoring unparseable conversation name"
            );
            return;
        };
        if !container.is_open() {
            self.detach(container.id);
            return;
        }

        if let Some(previous) = self.by_member.insert(member_id, container.id) {
            if previous != container.id {
                self.by_conversation.remove(&previous);
            }
        }
        self.by_conversation.insert(container.id, member_id);
    }

    fn detach(&self, conversation_id: Snowflake) {
        if let Some((_, member_id)) = self.by_conversation.remove(&conversation_id) {
            self.by_member
                .remove_if(&member_id, |_, current| *current == conversation_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(id: i64, name: &str) -> ConversationContainer {
        ConversationContainer::new(Snowflake::new(id), name)
    }

    #[test]
    fn test_rebuild_keeps_only_open_parseable_containers() {
        let index = ConversationIndex::new();
        let mut archived = container(2, "Review [200]");
        archived.archived = true;
        let mut locked = container(3, "Review [300]");
        locked.locked = true;

        index.rebuild(&[
            container(1, "Kael review [100]"),
            archived,
            locked,
            container(4, "no suffix"),
            container(5, "bad [12a]"),
        ]);

        assert_eq!(index.len(), 1);
        assert!(index.has(Snowflake::new(100)));
        assert!(!index.has(Snowflake::new(200)));
        assert!(!index.has(Snowflake::new(300)));
        assert_eq!(index.conversation_for(Snowflake::new(100)), Some(Snowflake::new(1)));
    }

    #[test]
    fn test_rebuild_clears_previous_entries() {
        let index = ConversationIndex::new();
        index.on_create(&container(1, "A [100]"));
        index.rebuild(&[container(2, "B [200]")]);
        assert!(!index.has(Snowflake::new(100)));
        assert!(index.has(Snowflake::new(200)));
    }

    #[test]
    fn test_last_processed_wins() {
        let index = ConversationIndex::new();
        index.on_create(&container(1, "first [100]"));
        index.on_create(&container(2, "second [100]"));
        assert_eq!(index.conversation_for(Snowflake::new(100)), Some(Snowflake::new(2)));

        // Deleting the superseded container leaves the newer entry alone
        index.on_delete(&container(1, "first [100]"));
        assert_eq!(index.conversation_for(Snowflake::new(100)), Some(Snowflake::new(2)));

        index.on_delete(&container(2, "second [100]"));
        assert!(!index.has(Snowflake::new(100)));
    }

    #[test]
    fn test_update_handles_archive_lock_and_rename() {
        let index = ConversationIndex::new();
        index.on_create(&container(1, "Review [100]"));

        let mut archived = container(1, "Review [100]");
        archived.archived = true;
        index.on_update(&archived);
        assert!(!index.has(Snowflake::new(100)));

        index.on_update(&container(1, "Review [100]"));
        assert!(index.has(Snowflake::new(100)));

        let mut locked = container(1, "Review [100]");
        locked.locked = true;
        index.on_update(&locked);
        assert!(!index.has(Snowflake::new(100)));

        index.on_update(&container(1, "Review [100]"));
        index.on_update(&container(1, "renamed without suffix"));
        assert!(index.has(Snowflake::new(100)));

        index.on_update(&container(1, "Review [555]"));
        assert!(!index.has(Snowflake::new(100)));
        assert!(index.has(Snowflake::new(555)));
    }

    #[test]
    fn test_unparseable_events_are_noops() {
        let index = ConversationIndex::new();
        index.on_create(&container(1, "Review [100]"));
        index.on_create(&container(2, "general chat"));
        index.on_update(&container(3, "still nothing"));
        index.on_delete(&container(4, "[]"));
        assert_eq!(index.len(), 1);
        assert!(index.has(Snowflake::new(100)));
    }

    #[test]
    fn test_delete_under_unparseable_name_keeps_entry() {
        let index = ConversationIndex::new();
        index.on_create(&container(1, "Review [100]"));
        index.on_delete(&container(1, "renamed without suffix"));
        assert!(index.has(Snowflake::new(100)));
        assert_eq!(index.conversation_for(Snowflake::new(100)), Some(Snowflake::new(1)));

        index.on_delete(&container(1, "Review [100]"));
        assert!(!index.has(Snowflake::new(100)));
    }
}
