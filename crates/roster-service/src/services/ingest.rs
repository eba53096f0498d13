//! Event ingestion
//!
//! Turns relayed platform events into reconciliation passes. Event payloads
//! only decide *which* member to reconcile; the pass itself refetches truth.
//!
//! Role changes made by the reconciler come back as member-update events.
//! Those are recognized by [`is_managed_role_only_change`] and dropped, so a
//! pass never triggers another pass for the same change.

use std::collections::HashSet;

use roster_core::{
    ConversationContainer, ManagedRoleIds, MemberUpdatedEvent, RosterEvent, Snowflake,
};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::projection::UpsertOutcome;

/// True iff the role sets differ and every differing role is a managed role
pub fn is_managed_role_only_change(
    old: &[Snowflake],
    new: &[Snowflake],
    managed: &ManagedRoleIds,
) -> bool {
    let old: HashSet<&Snowflake> = old.iter().collect();
    let new: HashSet<&Snowflake> = new.iter().collect();
    let mut differing = old.symmetric_difference(&new).peekable();
    differing.peek().is_some() && differing.all(|role| managed.contains(**role))
}

/// Why an event did not lead to a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OtherCommunity,
    ManagedRoleChange,
    Bot,
    NotReviewChannel,
    NoMemberInName,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OtherCommunity => "other community",
            Self::ManagedRoleChange => "managed role change",
            Self::Bot => "bot account",
            Self::NotReviewChannel => "not a review channel",
            Self::NoMemberInName => "no member id in conversation name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ignored(IgnoreReason),
    Processed(UpsertOutcome),
}

impl IngestOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Processed(outcome) if outcome.changed())
    }
}

#[derive(Debug, Clone, Copy)]
enum ConversationChange {
    Created,
    Updated,
    Deleted,
}

/// Ingestion service
pub struct IngestService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IngestService<'a> {
    /// Create a new IngestService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Handle one relayed event
    #[instrument(
        skip(self, event),
        fields(event_type = event.event_type(), member_id = ?event.member_id())
    )]
    pub async fn handle(&self, event: RosterEvent) -> IngestOutcome {
        if event.community_id() != self.ctx.layout().community_id {
            debug!(community_id = %event.community_id(), "Ignoring event from another community");
            return IngestOutcome::Ignored(IgnoreReason::OtherCommunity);
        }

        let outcome = match event {
            RosterEvent::MemberUpdated(e) => self.member_updated(e).await,
            RosterEvent::MemberRemoved(e) => {
                let was_tracked = self.ctx.projection().remove(e.member_id).await;
                if was_tracked {
                    info!(member_id = %e.member_id, "Member left, removed from roster");
                }
                IngestOutcome::Processed(UpsertOutcome::Purged { was_tracked })
            }
            RosterEvent::ConversationCreated(e) => {
                self.conversation(&e.container, ConversationChange::Created)
                    .await
            }
            RosterEvent::ConversationUpdated(e) => {
                self.conversation(&e.container, ConversationChange::Updated)
                    .await
            }
            RosterEvent::ConversationDeleted(e) => {
                self.conversation(&e.container, ConversationChange::Deleted)
                    .await
            }
        };

        if outcome.changed() {
            self.ctx.exporter().request_export();
        }
        outcome
    }

    async fn member_updated(&self, event: MemberUpdatedEvent) -> IngestOutcome {
        let member = event.member;
        if member.bot {
            return IngestOutcome::Ignored(IgnoreReason::Bot);
        }

        if let Some(old_roles) = &event.old_role_ids {
            if is_managed_role_only_change(
                old_roles,
                &member.role_ids,
                &self.ctx.layout().managed_roles,
            ) {
                debug!("Dropping managed-role-only update");
                return IngestOutcome::Ignored(IgnoreReason::ManagedRoleChange);
            }
        }

        IngestOutcome::Processed(self.ctx.projection().upsert(member.id).await)
    }

    async fn conversation(
        &self,
        container: &ConversationContainer,
        change: ConversationChange,
    ) -> IngestOutcome {
        let layout = self.ctx.layout();
        let in_review_channel = container
            .parent_id
            .is_some_and(|parent| layout.is_review_channel(parent));
        if !in_review_channel {
            return IngestOutcome::Ignored(IgnoreReason::NotReviewChannel);
        }

        let Some(member_id) = container.member_id() else {
            return IngestOutcome::Ignored(IgnoreReason::NoMemberInName);
        };

        let index = self.ctx.index();
        match change {
            ConversationChange::Created => index.on_create(container),
            ConversationChange::Updated => index.on_update(container),
            ConversationChange::Deleted => index.on_delete(container),
        }
        debug!(?change, %member_id, open = index.has(member_id), "Conversation index updated");

        IngestOutcome::Processed(self.ctx.projection().upsert(member_id).await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use roster_core::{
        ConversationEvent, MemberRemovedEvent, PlatformMember, RawRecord,
    };

    use super::*;
    use crate::testing::{sample_layout, test_engine, TestEngine};

    fn sf(id: i64) -> Snowflake {
        Snowflake::new(id)
    }

    fn roles(ids: &[i64]) -> Vec<Snowflake> {
        ids.iter().copied().map(Snowflake::new).collect()
    }

    fn member_updated(community: i64, old: Option<&[i64]>, member: PlatformMember) -> RosterEvent {
        RosterEvent::MemberUpdated(MemberUpdatedEvent {
            community_id: sf(community),
            old_role_ids: old.map(roles),
            member,
        })
    }

    fn conversation_event(container: ConversationContainer) -> ConversationEvent {
        ConversationEvent {
            community_id: sf(1),
            container,
        }
    }

    fn review_container(id: i64, name: &str) -> ConversationContainer {
        let mut container = ConversationContainer::new(sf(id), name);
        container.parent_id = Some(sf(70));
        container
    }

    fn seeded() -> TestEngine {
        let engine = test_engine();
        engine.platform.insert_member(
            PlatformMember::new(sf(5), "kael").with_roles(roles(&[100])),
        );
        engine.store.insert(
            RawRecord::new(sf(5))
                .with_affiliation("Alpha")
                .with_registered_name("Kael"),
        );
        engine
    }

    #[test]
    fn test_managed_role_only_change() {
        let managed = sample_layout().managed_roles;
        assert!(is_managed_role_only_change(&roles(&[100]), &roles(&[100, 10]), &managed));
        assert!(is_managed_role_only_change(&roles(&[10, 11, 100]), &roles(&[100]), &managed));
        // Mixed change
        assert!(!is_managed_role_only_change(&roles(&[100]), &roles(&[200, 10]), &managed));
        // No change at all
        assert!(!is_managed_role_only_change(&roles(&[100, 10]), &roles(&[10, 100]), &managed));
        // Unmanaged change
        assert!(!is_managed_role_only_change(&roles(&[100]), &roles(&[101]), &managed));
    }

    #[tokio::test]
    async fn test_other_community_is_ignored() {
        let engine = seeded();
        let member = engine.platform.member(sf(5)).unwrap();
        let outcome = IngestService::new(&engine.ctx)
            .handle(member_updated(2, None, member))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::OtherCommunity));
        assert!(engine.ctx.projection().is_empty());
    }

    #[tokio::test]
    async fn test_member_update_reconciles() {
        let engine = seeded();
        let member = engine.platform.member(sf(5)).unwrap();
        let outcome = IngestService::new(&engine.ctx)
            .handle(member_updated(1, Some(&[][..]), member))
            .await;
        assert_eq!(
            outcome,
            IngestOutcome::Processed(UpsertOutcome::Written { changed: true })
        );
        // Missing conversation flag was granted
        assert!(engine.platform.roles_of(sf(5)).contains(&sf(12)));
    }

    #[tokio::test]
    async fn test_reconciler_echo_is_dropped() {
        let engine = seeded();
        let service = IngestService::new(&engine.ctx);
        let member = engine.platform.member(sf(5)).unwrap();
        service.handle(member_updated(1, None, member)).await;
        engine.platform.clear_calls();

        // The platform reports the role grant the pass just made
        let echoed = engine.platform.member(sf(5)).unwrap();
        let outcome = service
            .handle(member_updated(1, Some(&[100][..]), echoed))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::ManagedRoleChange));
        assert!(engine.platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bot_updates_are_ignored() {
        let engine = test_engine();
        let mut bot = PlatformMember::new(sf(9), "helper");
        bot.bot = true;
        let outcome = IngestService::new(&engine.ctx)
            .handle(member_updated(1, None, bot))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::Bot));
    }

    #[tokio::test]
    async fn test_member_removed_purges_view() {
        let engine = seeded();
        let service = IngestService::new(&engine.ctx);
        engine.ctx.projection().upsert(sf(5)).await;

        let outcome = service
            .handle(RosterEvent::MemberRemoved(MemberRemovedEvent {
                community_id: sf(1),
                member_id: sf(5),
            }))
            .await;
        assert_eq!(
            outcome,
            IngestOutcome::Processed(UpsertOutcome::Purged { was_tracked: true })
        );
        assert!(outcome.changed());
        assert!(engine.ctx.projection().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_lifecycle_updates_index_then_member() {
        let engine = seeded();
        let service = IngestService::new(&engine.ctx);

        let created = review_container(900, "Kael review [5]");
        service
            .handle(RosterEvent::ConversationCreated(conversation_event(created.clone())))
            .await;
        assert!(engine.ctx.index().has(sf(5)));
        assert!(engine.ctx.projection().get(sf(5)).unwrap().has_open_conversation);
        assert!(!engine.platform.roles_of(sf(5)).contains(&sf(12)));

        let mut archived = created.clone();
        archived.archived = true;
        let outcome = service
            .handle(RosterEvent::ConversationUpdated(conversation_event(archived)))
            .await;
        assert!(outcome.changed());
        assert!(!engine.ctx.projection().get(sf(5)).unwrap().has_open_conversation);
        assert!(engine.platform.roles_of(sf(5)).contains(&sf(12)));

        service
            .handle(RosterEvent::ConversationUpdated(conversation_event(created.clone())))
            .await;
        service
            .handle(RosterEvent::ConversationDeleted(conversation_event(created)))
            .await;
        assert!(!engine.ctx.index().has(sf(5)));
    }

    #[tokio::test]
    async fn test_conversation_filters() {
        let engine = seeded();
        let service = IngestService::new(&engine.ctx);

        let mut elsewhere = ConversationContainer::new(sf(901), "Kael [5]");
        elsewhere.parent_id = Some(sf(71));
        let outcome = service
            .handle(RosterEvent::ConversationCreated(conversation_event(elsewhere)))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::NotReviewChannel));

        let outcome = service
            .handle(RosterEvent::ConversationCreated(conversation_event(
                review_container(902, "general questions"),
            )))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::NoMemberInName));
        assert!(engine.ctx.index().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_events_agree_with_rebuild() {
        let engine = seeded();
        let service = IngestService::new(&engine.ctx);

        let orphan = ConversationContainer::new(sf(903), "Kael [5]");
        let outcome = service
            .handle(RosterEvent::ConversationCreated(conversation_event(orphan.clone())))
            .await;
        assert_eq!(outcome, IngestOutcome::Ignored(IgnoreReason::NotReviewChannel));

        let reviewed = review_container(904, "Kael [5]");
        service
            .handle(RosterEvent::ConversationCreated(conversation_event(reviewed.clone())))
            .await;
        let via_event = engine.ctx.index().has(sf(5));

        engine.platform.add_conversation(orphan);
        engine.platform.add_conversation(reviewed);
        engine.ctx.sync().rebuild_index().await.unwrap();
        let via_rebuild = engine.ctx.index().has(sf(5));

        assert!(via_event);
        assert_eq!(via_event, via_rebuild);
        assert_eq!(engine.ctx.index().conversation_for(sf(5)), Some(sf(904)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_request_export() {
        let engine = seeded();
        let exporter = engine.ctx.exporter().start();
        let member = engine.platform.member(sf(5)).unwrap();

        IngestService::new(&engine.ctx)
            .handle(member_updated(1, None, member))
            .await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(engine.sink.write_count(), 1);

        engine.ctx.shutdown().trigger();
        exporter.await.unwrap();
    }
}
