//! Record store adapter
//!
//! Every read of the record store goes through here. Store field names never
//! leave the adapter; callers only see [`RawRecord`]. The shutdown flag is
//! checked before each query so no new store traffic starts once the process
//! is stopping.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use roster_core::{
    validate_registered_name, DomainError, LookupResult, RawRecord, RecordStore, ReviewRecord,
    ReviewUpdate, Snowflake, StoreUnavailable,
};
use tracing::{debug, instrument, warn};

use super::shutdown::ShutdownSignal;

/// Page size of a batched store lookup
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Result of a batched lookup
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Rows that were served, keyed by member id
    pub records: HashMap<Snowflake, RawRecord>,
    /// Members whose lookup failed even after the per-member fallback
    pub unavailable: HashSet<Snowflake>,
}

impl RecordBatch {
    /// Whether the member's lookup was served (with or without a row)
    pub fn was_served(&self, member_id: Snowflake) -> bool {
        !self.unavailable.contains(&member_id)
    }

    pub fn get(&self, member_id: Snowflake) -> Option<&RawRecord> {
        self.records.get(&member_id)
    }
}

/// Read/write access to member records
#[derive(Clone)]
pub struct RecordAdapter {
    store: Arc<dyn RecordStore>,
    shutdown: ShutdownSignal,
    chunk_size: usize,
}

impl RecordAdapter {
    pub fn new(store: Arc<dyn RecordStore>, shutdown: ShutdownSignal) -> Self {
        Self {
            store,
            shutdown,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the batch page size (clamped to at least one)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn ensure_running(&self) -> LookupResult<()> {
        if self.shutdown.is_shutting_down() {
            return Err(StoreUnavailable::ShuttingDown);
        }
        Ok(())
    }

    /// Check that the store answers
    pub async fn ping(&self) -> LookupResult<()> {
        self.ensure_running()?;
        self.store.ping().await
    }

    /// Fetch one member's record
    #[instrument(skip(self))]
    pub async fn fetch_one(&self, member_id: Snowflake) -> LookupResult<Option<RawRecord>> {
        self.ensure_running()?;
        self.store.find_by_member(member_id).await
    }

    /// Fetch records for many members in pages
    ///
    /// A failed page switches to concurrent single lookups for that page and
    /// every page after it. The batch is an error only on shutdown or when
    /// not a single lookup could be served.
    #[instrument(skip(self, member_ids), fields(count = member_ids.len()))]
    pub async fn fetch_many(&self, member_ids: &[Snowflake]) -> LookupResult<RecordBatch> {
        let mut seen = HashSet::with_capacity(member_ids.len());
        let ids: Vec<Snowflake> = member_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut batch = RecordBatch::default();
        if ids.is_empty() {
            return Ok(batch);
        }

        for (index, chunk) in ids.chunks(self.chunk_size).enumerate() {
            self.ensure_running()?;

            match self.store.find_by_members(chunk).await {
                Ok(rows) => {
                    batch
                        .records
                        .extend(rows.into_iter().map(|row| (row.member_id, row)));
                }
                Err(StoreUnavailable::ShuttingDown) => return Err(StoreUnavailable::ShuttingDown),
                Err(e) => {
                    let remaining = &ids[index * self.chunk_size..];
                    warn!(
                        error = %e,
                        chunk = index,
                        remaining = remaining.len(),
                        "Batched record lookup failed, falling back to single lookups"
                    );
                    return self.fetch_individually(remaining, batch, index > 0).await;
                }
            }
        }

        debug!(found = batch.records.len(), "Fetched records");
        Ok(batch)
    }

    async fn fetch_individually(
        &self,
        remaining: &[Snowflake],
        mut batch: RecordBatch,
        any_served: bool,
    ) -> LookupResult<RecordBatch> {
        let results = join_all(remaining.iter().map(|id| self.fetch_one(*id))).await;

        let mut served = 0usize;
        let mut last_error = None;
        for (member_id, result) in remaining.iter().copied().zip(results) {
            match result {
                Ok(Some(record)) => {
                    batch.records.insert(member_id, record);
                    served += 1;
                }
                Ok(None) => served += 1,
                Err(StoreUnavailable::ShuttingDown) => return Err(StoreUnavailable::ShuttingDown),
                Err(e) => {
                    batch.unavailable.insert(member_id);
                    last_error = Some(e);
                }
            }
        }

        if served == 0 && !any_served {
            return Err(last_error
                .unwrap_or_else(|| StoreUnavailable::Unreachable("no lookups served".into())));
        }

        if !batch.unavailable.is_empty() {
            warn!(
                served,
                unavailable = batch.unavailable.len(),
                "Record lookups partially served"
            );
        }
        Ok(batch)
    }

    /// Validate and store a registered name, returning the normalized form
    #[instrument(skip(self))]
    pub async fn save_registered_name(
        &self,
        member_id: Snowflake,
        raw_name: &str,
    ) -> Result<String, DomainError> {
        let name = validate_registered_name(raw_name)?;
        self.ensure_running()?;
        self.store.upsert_registered_name(member_id, &name).await?;
        Ok(name)
    }

    /// Read a member's review data; an absent row reads as the default record
    #[instrument(skip(self))]
    pub async fn review(&self, member_id: Snowflake) -> Result<ReviewRecord, DomainError> {
        self.ensure_running()?;
        Ok(self
            .store
            .find_review(member_id)
            .await?
            .unwrap_or_default())
    }

    /// Apply a review update stamped with today's date
    #[instrument(skip(self, update))]
    pub async fn update_review(
        &self,
        member_id: Snowflake,
        update: &ReviewUpdate,
    ) -> Result<ReviewRecord, DomainError> {
        let current = self.review(member_id).await?;
        let next = current.apply(update, Utc::now().date_naive())?;
        self.ensure_running()?;
        self.store.upsert_review(member_id, &next).await?;
        Ok(next)
    }
}

impl std::fmt::Debug for RecordAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAdapter")
            .field("chunk_size", &self.chunk_size)
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::InMemoryRecordStore;

    fn ids(range: std::ops::Range<i64>) -> Vec<Snowflake> {
        range.map(Snowflake::new).collect()
    }

    fn adapter(store: &Arc<InMemoryRecordStore>) -> (RecordAdapter, ShutdownSignal) {
        let shutdown = ShutdownSignal::new();
        let adapter = RecordAdapter::new(store.clone(), shutdown.clone()).with_chunk_size(10);
        (adapter, shutdown)
    }

    #[tokio::test]
    async fn test_fetch_many_chunks_and_omits_missing_rows() {
        let store = Arc::new(InMemoryRecordStore::new());
        for id in ids(1..26).into_iter().filter(|id| id.into_inner() % 2 == 0) {
            store.insert(RawRecord::new(id).with_affiliation("Alpha"));
        }
        let (adapter, _) = adapter(&store);

        let batch = adapter.fetch_many(&ids(1..26)).await.unwrap();
        assert_eq!(batch.records.len(), 12);
        assert!(batch.unavailable.is_empty());
        assert!(batch.get(Snowflake::new(4)).is_some());
        assert!(batch.get(Snowflake::new(5)).is_none());
        assert_eq!(store.batch_queries.load(Ordering::SeqCst), 3);
        assert_eq!(store.single_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_many_falls_back_after_chunk_failure() {
        let store = Arc::new(InMemoryRecordStore::new());
        for id in ids(1..26) {
            store.insert(RawRecord::new(id).with_affiliation("Alpha"));
        }
        // First page succeeds, the second fails
        store.fail_batches_after(1);
        store.fail_member(Snowflake::new(15));
        let (adapter, _) = adapter(&store);

        let batch = adapter.fetch_many(&ids(1..26)).await.unwrap();
        assert_eq!(batch.records.len(), 24);
        assert_eq!(batch.unavailable, HashSet::from([Snowflake::new(15)]));
        assert!(!batch.was_served(Snowflake::new(15)));
        // 15 remaining members were looked up one at a time
        assert_eq!(store.single_queries.load(Ordering::SeqCst), 15);
    }

    #[tokio::test]
    async fn test_fetch_many_fails_when_nothing_served() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.set_unreachable(true);
        let (adapter, _) = adapter(&store);

        let err = adapter.fetch_many(&ids(1..5)).await.unwrap_err();
        assert!(matches!(err, StoreUnavailable::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_shutdown_stops_queries() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert(RawRecord::new(Snowflake::new(1)).with_affiliation("Alpha"));
        let (adapter, shutdown) = adapter(&store);
        shutdown.trigger();

        assert_eq!(
            adapter.fetch_one(Snowflake::new(1)).await.unwrap_err(),
            StoreUnavailable::ShuttingDown
        );
        assert_eq!(
            adapter.fetch_many(&ids(1..3)).await.unwrap_err(),
            StoreUnavailable::ShuttingDown
        );
        assert_eq!(store.single_queries.load(Ordering::SeqCst), 0);
        assert_eq!(store.batch_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_many_dedupes_and_handles_empty_input() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (adapter, _) = adapter(&store);

        assert!(adapter.fetch_many(&[]).await.unwrap().records.is_empty());
        assert_eq!(store.batch_queries.load(Ordering::SeqCst), 0);

        let one = Snowflake::new(7);
        adapter.fetch_many(&[one, one, one]).await.unwrap();
        assert_eq!(store.batch_queries.load(Ordering::SeqCst), 1);
        assert_eq!(store.last_batch_len.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_save_registered_name_validates_and_creates_row() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (adapter, _) = adapter(&store);
        let member = Snowflake::new(42);

        let err = adapter.save_registered_name(member, "a b").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidName(_)));

        let saved = adapter.save_registered_name(member, "  Kael ").await.unwrap();
        assert_eq!(saved, "Kael");
        let record = adapter.fetch_one(member).await.unwrap().unwrap();
        assert_eq!(record.registered_name(), Some("Kael"));
        assert!(!record.has_affiliation());
    }

    #[tokio::test]
    async fn test_update_review_reads_default_and_persists() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (adapter, _) = adapter(&store);
        let member = Snowflake::new(9);

        assert_eq!(adapter.review(member).await.unwrap(), ReviewRecord::default());

        let update = ReviewUpdate {
            has_vod: Some(true),
            gear_score: Some(710),
            ..ReviewUpdate::default()
        };
        let review = adapter.update_review(member, &update).await.unwrap();
        assert!(review.has_vod);
        assert!(!review.vod_check_date.is_empty());
        assert_eq!(adapter.review(member).await.unwrap(), review);

        let refresh = ReviewUpdate {
            refresh_gear_date: true,
            ..ReviewUpdate::default()
        };
        let err = adapter.update_review(member, &refresh).await.unwrap_err();
        assert!(matches!(err, DomainError::ReviewDateRefreshRejected("gear")));
    }
}
