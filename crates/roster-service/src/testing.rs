//! In-memory port implementations for tests
//!
//! Enabled for this crate's unit tests and, through the `test-support`
//! feature, for the workspace integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use roster_common::ScheduleConfig;
use roster_core::{
    ClassCategory, ConversationContainer, DomainError, ExportRow, ExportSink, LookupResult,
    ManagedRoleIds, MemberPlatform, PlatformMember, RawRecord, RecordStore, RepoResult,
    ReviewRecord, RosterLayout, Snowflake, StoreUnavailable, WeaponRole,
};

use crate::services::{ServiceContext, ShutdownSignal};

// ============================================================================
// Record store
// ============================================================================

/// Record store backed by a hash map, with switchable failure modes
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<Snowflake, RawRecord>>,
    reviews: Mutex<HashMap<Snowflake, ReviewRecord>>,
    unreachable: AtomicBool,
    failing_members: Mutex<HashSet<Snowflake>>,
    batch_budget: Mutex<Option<usize>>,
    pub single_queries: AtomicUsize,
    pub batch_queries: AtomicUsize,
    pub last_batch_len: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: RawRecord) {
        self.records.lock().insert(record.member_id, record);
    }

    pub fn remove(&self, member_id: Snowflake) {
        self.records.lock().remove(&member_id);
    }

    pub fn record(&self, member_id: Snowflake) -> Option<RawRecord> {
        self.records.lock().get(&member_id).cloned()
    }

    /// Make every query fail as unreachable
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make single lookups for one member fail
    pub fn fail_member(&self, member_id: Snowflake) {
        self.failing_members.lock().insert(member_id);
    }

    /// Let `count` more batch queries succeed, then fail every later one
    pub fn fail_batches_after(&self, count: usize) {
        *self.batch_budget.lock() = Some(count);
    }

    fn check_reachable(&self) -> LookupResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreUnavailable::Unreachable("store offline".into()));
        }
        Ok(())
    }

    fn with_review(&self, mut record: RawRecord) -> RawRecord {
        record.review = self.reviews.lock().get(&record.member_id).cloned();
        record
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn ping(&self) -> LookupResult<()> {
        self.check_reachable()
    }

    async fn find_by_member(&self, member_id: Snowflake) -> LookupResult<Option<RawRecord>> {
        self.single_queries.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if self.failing_members.lock().contains(&member_id) {
            return Err(StoreUnavailable::Unreachable(format!("lookup for {member_id} failed")));
        }
        let record = self.records.lock().get(&member_id).cloned();
        Ok(record.map(|r| self.with_review(r)))
    }

    async fn find_by_members(&self, member_ids: &[Snowflake]) -> LookupResult<Vec<RawRecord>> {
        self.batch_queries.fetch_add(1, Ordering::SeqCst);
        self.last_batch_len.store(member_ids.len(), Ordering::SeqCst);
        self.check_reachable()?;
        {
            let mut budget = self.batch_budget.lock();
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(StoreUnavailable::Unreachable("batch query failed".into()));
                }
                *remaining -= 1;
            }
        }
        let records: Vec<RawRecord> = {
            let map = self.records.lock();
            member_ids.iter().filter_map(|id| map.get(id).cloned()).collect()
        };
        Ok(records.into_iter().map(|r| self.with_review(r)).collect())
    }

    async fn upsert_registered_name(&self, member_id: Snowflake, name: &str) -> RepoResult<()> {
        self.check_reachable()?;
        let mut records = self.records.lock();
        let record = records
            .entry(member_id)
            .or_insert_with(|| RawRecord::new(member_id));
        record.registered_name = Some(name.to_string());
        Ok(())
    }

    async fn find_review(&self, member_id: Snowflake) -> RepoResult<Option<ReviewRecord>> {
        self.check_reachable()?;
        Ok(self.reviews.lock().get(&member_id).cloned())
    }

    async fn upsert_review(&self, member_id: Snowflake, review: &ReviewRecord) -> RepoResult<()> {
        self.check_reachable()?;
        self.reviews.lock().insert(member_id, review.clone());
        Ok(())
    }
}

// ============================================================================
// Platform
// ============================================================================

/// A role mutation the fake platform received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    Add(Snowflake, Vec<Snowflake>),
    Remove(Snowflake, Vec<Snowflake>),
}

/// Platform with members held in memory; role mutations apply to them
#[derive(Debug, Default)]
pub struct FakePlatform {
    members: Mutex<HashMap<Snowflake, PlatformMember>>,
    conversations: Mutex<Vec<ConversationContainer>>,
    calls: Mutex<Vec<RoleCall>>,
    fail_mutations: AtomicBool,
    fail_reads: AtomicBool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_member(&self, member: PlatformMember) {
        self.members.lock().insert(member.id, member);
    }

    pub fn remove_member(&self, member_id: Snowflake) {
        self.members.lock().remove(&member_id);
    }

    pub fn member(&self, member_id: Snowflake) -> Option<PlatformMember> {
        self.members.lock().get(&member_id).cloned()
    }

    pub fn roles_of(&self, member_id: Snowflake) -> Vec<Snowflake> {
        self.member(member_id)
            .map(|m| m.role_ids)
            .unwrap_or_default()
    }

    pub fn add_conversation(&self, container: ConversationContainer) {
        self.conversations.lock().push(container);
    }

    /// Role mutations received so far
    pub fn calls(&self) -> Vec<RoleCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> RepoResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::PlatformError("platform offline".into()));
        }
        Ok(())
    }

    fn mutate(&self, call: RoleCall) -> RepoResult<()> {
        self.calls.lock().push(call.clone());
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(DomainError::PlatformError("missing permissions".into()));
        }
        let mut members = self.members.lock();
        match call {
            RoleCall::Add(id, roles) => {
                if let Some(member) = members.get_mut(&id) {
                    for role in roles {
                        if !member.role_ids.contains(&role) {
                            member.role_ids.push(role);
                        }
                    }
                }
            }
            RoleCall::Remove(id, roles) => {
                if let Some(member) = members.get_mut(&id) {
                    member.role_ids.retain(|r| !roles.contains(r));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MemberPlatform for FakePlatform {
    async fn fetch_member(&self, member_id: Snowflake) -> RepoResult<Option<PlatformMember>> {
        self.check_reads()?;
        Ok(self.member(member_id))
    }

    async fn list_members(&self) -> RepoResult<Vec<PlatformMember>> {
        self.check_reads()?;
        let mut members: Vec<PlatformMember> = self.members.lock().values().cloned().collect();
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    async fn add_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()> {
        self.mutate(RoleCall::Add(member_id, role_ids.to_vec()))
    }

    async fn remove_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()> {
        self.mutate(RoleCall::Remove(member_id, role_ids.to_vec()))
    }

    async fn list_review_conversations(
        &self,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<ConversationContainer>> {
        self.check_reads()?;
        Ok(self
            .conversations
            .lock()
            .iter()
            .filter(|c| c.parent_id.is_some_and(|p| channel_ids.contains(&p)))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Export sink
// ============================================================================

/// Sink that records every successful write
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<Vec<ExportRow>>>,
    failures_left: AtomicUsize,
    pub attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` writes
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<Vec<ExportRow>> {
        self.writes.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn last_write(&self) -> Option<Vec<ExportRow>> {
        self.writes.lock().last().cloned()
    }
}

#[async_trait]
impl ExportSink for RecordingSink {
    async fn replace_all(&self, rows: &[ExportRow]) -> RepoResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(DomainError::SinkError("quota exceeded".into()));
        }
        self.writes.lock().push(rows.to_vec());
        Ok(())
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Small layout used across tests
///
/// Categories: Tank (100 "SnS/GS", 101 "SnS/Wand"), Healer (200 "Wand/Bow").
/// Managed roles 10/11/12, authorized role 50, review channel 70,
/// community 1.
pub fn sample_layout() -> RosterLayout {
    let role = |id: i64, name: &str| WeaponRole {
        id: Snowflake::new(id),
        name: name.to_string(),
    };
    RosterLayout {
        community_id: Snowflake::new(1),
        class_categories: vec![
            ClassCategory {
                name: "Tank".to_string(),
                roles: vec![role(100, "SnS/GS"), role(101, "SnS/Wand")],
            },
            ClassCategory {
                name: "Healer".to_string(),
                roles: vec![role(200, "Wand/Bow")],
            },
        ],
        managed_roles: ManagedRoleIds {
            missing_name: Snowflake::new(10),
            missing_class: Snowflake::new(11),
            missing_conversation: Snowflake::new(12),
        },
        authorized_roles: vec![Snowflake::new(50)],
        review_channels: vec![Snowflake::new(70)],
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A fully wired context over in-memory ports
pub struct TestEngine {
    pub ctx: ServiceContext,
    pub store: Arc<InMemoryRecordStore>,
    pub platform: Arc<FakePlatform>,
    pub sink: Arc<RecordingSink>,
}

/// Build a [`TestEngine`] over [`sample_layout`] with default schedule timings
pub fn test_engine() -> TestEngine {
    test_engine_with(sample_layout())
}

pub fn test_engine_with(layout: RosterLayout) -> TestEngine {
    let store = Arc::new(InMemoryRecordStore::new());
    let platform = Arc::new(FakePlatform::new());
    let sink = Arc::new(RecordingSink::new());
    let ctx = ServiceContext::new(
        Arc::new(layout),
        store.clone(),
        platform.clone(),
        sink.clone(),
        &ScheduleConfig::default(),
        ShutdownSignal::new(),
    );
    TestEngine {
        ctx,
        store,
        platform,
        sink,
    }
}
