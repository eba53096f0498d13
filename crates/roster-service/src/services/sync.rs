//! Full sync
//!
//! Reconciles every member of the community against the record store. Runs
//! once at startup, right after the conversation index is rebuilt, and then
//! on a fixed interval to repair anything the event stream missed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use roster_core::{DomainError, MemberPlatform, RosterLayout, Snowflake};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use super::conversation_index::ConversationIndex;
use super::exporter::ExportScheduler;
use super::projection::{RecordLookup, RosterProjection, UpsertOutcome};
use super::records::RecordAdapter;
use super::shutdown::ShutdownSignal;

/// Tally of one full sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub listed: usize,
    pub bots: usize,
    pub written: usize,
    pub purged: usize,
    pub aborted: usize,
    /// Members skipped because their record lookup could not be served
    pub unavailable: usize,
    /// Views dropped because the member is no longer listed
    pub departed: usize,
}

pub struct SyncScheduler {
    layout: Arc<RosterLayout>,
    platform: Arc<dyn MemberPlatform>,
    records: RecordAdapter,
    index: Arc<ConversationIndex>,
    projection: Arc<RosterProjection>,
    exporter: Arc<ExportScheduler>,
    shutdown: ShutdownSignal,
    interval: Duration,
}

impl SyncScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        layout: Arc<RosterLayout>,
        platform: Arc<dyn MemberPlatform>,
        records: RecordAdapter,
        index: Arc<ConversationIndex>,
        projection: Arc<RosterProjection>,
        exporter: Arc<ExportScheduler>,
        shutdown: ShutdownSignal,
        interval: Duration,
    ) -> Self {
        Self {
            layout,
            platform,
            records,
            index,
            projection,
            exporter,
            shutdown,
            interval,
        }
    }

    /// Rebuild the conversation index from every review channel
    #[instrument(skip(self))]
    pub async fn rebuild_index(&self) -> Result<usize, DomainError> {
        let containers = self
            .platform
            .list_review_conversations(&self.layout.review_channels)
            .await?;
        self.index.rebuild(&containers);
        Ok(self.index.len())
    }

    /// Startup sequence: index first, then a full sync
    pub async fn bootstrap(&self) -> Result<SyncSummary, DomainError> {
        if let Err(e) = self.rebuild_index().await {
            warn!(error = %e, "Conversation index rebuild failed, continuing with an empty index");
        }
        self.sync_all().await
    }

    /// Reconcile every listed member
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<SyncSummary, DomainError> {
        let members = self.platform.list_members().await?;
        let mut summary = SyncSummary {
            listed: members.len(),
            ..SyncSummary::default()
        };

        let humans: Vec<_> = members.into_iter().filter(|m| !m.bot).collect();
        summary.bots = summary.listed - humans.len();

        let ids: Vec<Snowflake> = humans.iter().map(|m| m.id).collect();
        let batch = match self.records.fetch_many(&ids).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Record store unavailable, sync pass aborted");
                return Err(e.into());
            }
        };

        let passes = humans
            .iter()
            .filter(|member| batch.was_served(member.id))
            .map(|member| {
                let lookup = match batch.get(member.id) {
                    Some(record) => RecordLookup::Found(record.clone()),
                    None => RecordLookup::Absent,
                };
                self.projection.reconcile_member(member, lookup)
            });
        for outcome in join_all(passes).await {
            match outcome {
                UpsertOutcome::Written { .. } => summary.written += 1,
                UpsertOutcome::Purged { .. } => summary.purged += 1,
                UpsertOutcome::Aborted => summary.aborted += 1,
            }
        }
        summary.unavailable = batch.unavailable.len();

        let listed: HashSet<Snowflake> = ids.into_iter().collect();
        for member_id in self.projection.member_ids() {
            if !listed.contains(&member_id) && self.projection.remove(member_id).await {
                summary.departed += 1;
            }
        }

        self.exporter.request_export();
        info!(
            listed = summary.listed,
            written = summary.written,
            purged = summary.purged,
            unavailable = summary.unavailable,
            departed = summary.departed,
            tracked = self.projection.len(),
            "Full sync finished"
        );
        Ok(summary)
    }

    /// Spawn the periodic sync loop; it ends when shutdown is triggered
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Sync scheduler started");
        loop {
            tokio::select! {
                () = sleep(self.interval) => {
                    if let Err(e) = self.sync_all().await {
                        warn!(error = %e, "Periodic sync failed");
                    }
                }
                () = self.shutdown.wait() => break,
            }
        }
        info!("Sync scheduler stopped");
    }
}

impl std::fmt::Debug for SyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("interval", &self.interval)
            .finish()
    }
}
