//! Roster projection
//!
//! The single owned table of [`MemberView`]s. Every write rebuilds a view
//! from fresh platform and record data; nothing else mutates the table.
//!
//! Passes for the same member are serialized through a per-member async
//! lock, while different members proceed concurrently. The table itself is
//! never locked across I/O.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use roster_core::{
    LookupResult, MemberPlatform, MemberView, PlatformMember, RawRecord, RosterLayout, Snowflake,
    StoreUnavailable,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::conversation_index::ConversationIndex;
use super::deriver::derive;
use super::reconciler::Reconciler;
use super::records::RecordAdapter;

/// Record lookup handed to a reconciliation pass
#[derive(Debug, Clone)]
pub enum RecordLookup {
    Found(RawRecord),
    Absent,
    Unavailable(StoreUnavailable),
}

impl From<LookupResult<Option<RawRecord>>> for RecordLookup {
    fn from(result: LookupResult<Option<RawRecord>>) -> Self {
        match result {
            Ok(Some(record)) => Self::Found(record),
            Ok(None) => Self::Absent,
            Err(e) => Self::Unavailable(e),
        }
    }
}

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A full view was written
    Written { changed: bool },
    /// The member is not (or no longer) tracked
    Purged { was_tracked: bool },
    /// Truth could not be fetched; the existing view was left untouched
    Aborted,
}

impl UpsertOutcome {
    /// Whether the projection content changed
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Self::Written { changed: true } | Self::Purged { was_tracked: true }
        )
    }
}

pub struct RosterProjection {
    views: DashMap<Snowflake, MemberView>,
    locks: DashMap<Snowflake, Arc<Mutex<()>>>,
    records: RecordAdapter,
    platform: Arc<dyn MemberPlatform>,
    reconciler: Reconciler,
    index: Arc<ConversationIndex>,
    layout: Arc<RosterLayout>,
}

impl RosterProjection {
    pub fn new(
        records: RecordAdapter,
        platform: Arc<dyn MemberPlatform>,
        index: Arc<ConversationIndex>,
        layout: Arc<RosterLayout>,
    ) -> Self {
        let reconciler = Reconciler::new(platform.clone(), layout.managed_roles);
        Self {
            views: DashMap::new(),
            locks: DashMap::new(),
            records,
            platform,
            reconciler,
            index,
            layout,
        }
    }

    /// Reconcile one member from freshly fetched truth
    #[instrument(skip(self))]
    pub async fn upsert(&self, member_id: Snowflake) -> UpsertOutcome {
        self.serialized(member_id, async {
            let member = match self.platform.fetch_member(member_id).await {
                Ok(Some(member)) => member,
                Ok(None) => {
                    let was_tracked = self.purge(member_id);
                    debug!(was_tracked, "Member is no longer in the community");
                    return UpsertOutcome::Purged { was_tracked };
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch member, keeping current view");
                    return UpsertOutcome::Aborted;
                }
            };

            let lookup = self.records.fetch_one(member_id).await.into();
            self.apply(&member, lookup).await
        })
        .await
    }

    /// Reconcile a member whose platform state and record were already fetched
    #[instrument(skip(self, member, lookup), fields(member_id = %member.id))]
    pub async fn reconcile_member(
        &self,
        member: &PlatformMember,
        lookup: RecordLookup,
    ) -> UpsertOutcome {
        self.serialized(member.id, self.apply(member, lookup)).await
    }

    /// Drop a member's view, e.g. after they left the community
    #[instrument(skip(self))]
    pub async fn remove(&self, member_id: Snowflake) -> bool {
        self.serialized(member_id, async { self.purge(member_id) })
            .await
    }

    pub fn get(&self, member_id: Snowflake) -> Option<MemberView> {
        self.views.get(&member_id).map(|view| view.value().clone())
    }

    pub fn contains(&self, member_id: Snowflake) -> bool {
        self.views.contains_key(&member_id)
    }

    /// Snapshot of every view, in no particular order
    pub fn all(&self) -> Vec<MemberView> {
        self.views.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn member_ids(&self) -> Vec<Snowflake> {
        self.views.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    async fn apply(&self, member: &PlatformMember, lookup: RecordLookup) -> UpsertOutcome {
        let record = match lookup {
            RecordLookup::Found(record) if record.has_affiliation() => record,
            RecordLookup::Found(_) | RecordLookup::Absent => {
                self.reconciler.strip_all(member).await;
                let was_tracked = self.purge(member.id);
                if was_tracked {
                    info!(member_id = %member.id, "Member lost affiliation, removed from roster");
                }
                return UpsertOutcome::Purged { was_tracked };
            }
            RecordLookup::Unavailable(e) => {
                warn!(member_id = %member.id, error = %e, "Record store unavailable, pass aborted");
                return UpsertOutcome::Aborted;
            }
        };

        let has_open_conversation = self.index.has(member.id);
        let derived = derive(
            &member.role_ids,
            Some(&record),
            has_open_conversation,
            &self.layout,
        );

        // Role mutations complete before the view is written
        self.reconciler.reconcile(member, derived.flags).await;

        let view = MemberView {
            member_id: member.id,
            username: member.username.clone(),
            display_name: member.display_name().to_string(),
            registered_name: record.registered_name().map(str::to_string),
            affiliation: record.affiliation().map(str::to_string),
            class_category: derived.class_category,
            weapon_primary: derived.weapon_primary,
            weapon_secondary: derived.weapon_secondary,
            weapon_role_id: derived.weapon_role_id,
            has_open_conversation,
            last_updated: Utc::now(),
        };

        let changed = self
            .views
            .get(&member.id)
            .map_or(true, |current| !current.same_content(&view));
        self.views.insert(member.id, view);
        debug!(member_id = %member.id, changed, "Member view written");

        UpsertOutcome::Written { changed }
    }

    fn purge(&self, member_id: Snowflake) -> bool {
        self.views.remove(&member_id).is_some()
    }

    async fn serialized<F, T>(&self, member_id: Snowflake, pass: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let lock = self.locks.entry(member_id).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            pass.await
        };
        drop(lock);
        self.locks
            .remove_if(&member_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }
}

impl std::fmt::Debug for RosterProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterProjection")
            .field("views", &self.views.len())
            .field("locks", &self.locks.len())
            .finish()
    }
}
