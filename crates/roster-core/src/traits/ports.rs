//! Port traits - the external collaborators the roster engine depends on
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL, the platform REST API, the
//! spreadsheet sink). Services only ever hold these as `Arc<dyn Trait>`.

use async_trait::async_trait;

use crate::entities::{ConversationContainer, ExportRow, PlatformMember, RawRecord, ReviewRecord};
use crate::error::{DomainError, StoreUnavailable};
use crate::value_objects::Snowflake;

/// Result type for port operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Result type for record lookups, which fail only when the store is unreachable
pub type LookupResult<T> = Result<T, StoreUnavailable>;

// ============================================================================
// Record Store
// ============================================================================

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> LookupResult<()>;

    /// Find one member's record, including review data
    async fn find_by_member(&self, member_id: Snowflake) -> LookupResult<Option<RawRecord>>;

    /// Find records for a batch of members (members without a row are omitted)
    async fn find_by_members(&self, member_ids: &[Snowflake]) -> LookupResult<Vec<RawRecord>>;

    /// Set a member's registered name, creating the record if absent
    async fn upsert_registered_name(&self, member_id: Snowflake, name: &str) -> RepoResult<()>;

    /// Find a member's review data
    async fn find_review(&self, member_id: Snowflake) -> RepoResult<Option<ReviewRecord>>;

    /// Replace a member's review data
    async fn upsert_review(&self, member_id: Snowflake, review: &ReviewRecord) -> RepoResult<()>;
}

// ============================================================================
// Member Platform
// ============================================================================

#[async_trait]
pub trait MemberPlatform: Send + Sync {
    /// Fetch a member of the tracked community, `None` if they are not in it
    async fn fetch_member(&self, member_id: Snowflake) -> RepoResult<Option<PlatformMember>>;

    /// List every member of the tracked community
    async fn list_members(&self) -> RepoResult<Vec<PlatformMember>>;

    /// Grant roles to a member in a single mutation
    async fn add_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()>;

    /// Revoke roles from a member in a single mutation
    async fn remove_roles(&self, member_id: Snowflake, role_ids: &[Snowflake]) -> RepoResult<()>;

    /// List active and archived conversations under the given channels
    async fn list_review_conversations(
        &self,
        channel_ids: &[Snowflake],
    ) -> RepoResult<Vec<ConversationContainer>>;
}

// ============================================================================
// Export Sink
// ============================================================================

#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Replace the sink contents with a header row followed by `rows`
    async fn replace_all(&self, rows: &[ExportRow]) -> RepoResult<()>;
}
