//! Test fixtures and data generators
//!
//! Ids follow the sample layout used by the in-memory engine: community 1,
//! Tank weapon roles 100/101, Healer weapon role 200, managed roles
//! 10 (missing name), 11 (missing class), 12 (missing conversation),
//! officer role 50, review channel 70.

use std::sync::atomic::{AtomicI64, Ordering};

use roster_core::{PlatformMember, RawRecord, Snowflake};
use serde::Deserialize;
use serde_json::{json, Value};

pub const COMMUNITY_ID: i64 = 1;
pub const TANK_SNS_GS: i64 = 100;
pub const HEALER_WAND_BOW: i64 = 200;
pub const MISSING_NAME: i64 = 10;
pub const MISSING_CLASS: i64 = 11;
pub const MISSING_CONVERSATION: i64 = 12;
pub const OFFICER_ROLE: i64 = 50;
pub const REVIEW_CHANNEL: i64 = 70;

/// Counter for unique member ids
static COUNTER: AtomicI64 = AtomicI64::new(10_000);

/// Get a unique member id
pub fn unique_member_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub fn roles(ids: &[i64]) -> Vec<Snowflake> {
    ids.iter().copied().map(Snowflake::new).collect()
}

/// A platform member holding the given roles
pub fn member(id: Snowflake, role_ids: &[i64]) -> PlatformMember {
    PlatformMember::new(id, format!("user{id}")).with_roles(roles(role_ids))
}

/// A stored record with an affiliation
pub fn affiliated_record(id: Snowflake, affiliation: &str) -> RawRecord {
    RawRecord::new(id).with_affiliation(affiliation)
}

// ============================================================================
// Request Bodies
// ============================================================================

pub fn member_updated_body(member: &PlatformMember, old_roles: Option<&[i64]>) -> Value {
    json!({
        "community_id": COMMUNITY_ID.to_string(),
        "old_role_ids": old_roles.map(roles),
        "member": member,
    })
}

pub fn member_removed_body(member_id: Snowflake) -> Value {
    json!({
        "community_id": COMMUNITY_ID.to_string(),
        "member_id": member_id,
    })
}

/// A review conversation for `member_id` under the review channel
pub fn conversation_body(container_id: i64, member_id: Snowflake, archived: bool) -> Value {
    json!({
        "community_id": COMMUNITY_ID.to_string(),
        "container": {
            "id": container_id.to_string(),
            "name": format!("Review [{member_id}]"),
            "parent_id": REVIEW_CHANNEL.to_string(),
            "archived": archived,
            "locked": false,
        },
    })
}

// ============================================================================
// Response Bodies
// ============================================================================

/// Event acknowledgement
#[derive(Debug, Deserialize)]
pub struct EventAck {
    pub outcome: String,
    pub reason: Option<String>,
    pub changed: bool,
}

/// Roster snapshot entry
#[derive(Debug, Deserialize)]
pub struct RosterEntry {
    pub member_id: String,
    pub registered_name: Option<String>,
    pub affiliation: Option<String>,
    pub class_category: Option<String>,
    pub weapon_primary: Option<String>,
    pub weapon_secondary: Option<String>,
    pub weapon_role_id: Option<String>,
    pub has_open_conversation: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetNameResult {
    pub member_id: String,
    pub registered_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSummary {
    pub has_vod: bool,
    pub vod_check_date: Option<String>,
    pub gear_checked: bool,
    pub gear_check_date: Option<String>,
    pub gear_score: i32,
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberInfo {
    pub member_id: String,
    pub registered_name: Option<String>,
    pub affiliation: Option<String>,
    pub class_category: Option<String>,
    pub weapon: Option<String>,
    pub has_open_conversation: bool,
    pub review: ReviewSummary,
}

/// Error envelope returned for every failure
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Readiness {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Deserialize)]
pub struct ReadinessChecks {
    pub record_store: String,
    pub tracked_members: usize,
    pub open_conversations: usize,
}
