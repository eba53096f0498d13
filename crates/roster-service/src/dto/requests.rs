//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Name rules themselves are enforced by the domain validator; the limits
//! here only bound payload size.

use roster_core::{ReviewUpdate, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Name Requests
// ============================================================================

/// Member registers their own in-game name
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetNameRequest {
    pub member_id: Snowflake,

    #[validate(length(max = 64, message = "Name must be at most 64 characters"))]
    pub name: String,
}

/// Officer sets another member's name
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverrideNameRequest {
    /// Roles the invoking member holds
    #[serde(default)]
    pub actor_roles: Vec<Snowflake>,

    pub target_id: Snowflake,

    #[validate(length(max = 64, message = "Name must be at most 64 characters"))]
    pub name: String,
}

// ============================================================================
// Lookup Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LookupInfoRequest {
    pub requester_id: Snowflake,
    pub target_id: Snowflake,
}

// ============================================================================
// Review Requests
// ============================================================================

/// Officer updates a member's review data
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub actor_roles: Vec<Snowflake>,

    pub target_id: Snowflake,

    pub has_vod: Option<bool>,

    pub gear_checked: Option<bool>,

    /// Re-stamp the VOD check date (only while `has_vod` is set)
    #[serde(default)]
    pub refresh_vod_date: bool,

    /// Re-stamp the gear check date (only while `gear_checked` is set)
    #[serde(default)]
    pub refresh_gear_date: bool,

    #[validate(range(min = 0, max = 100_000, message = "Gear score must be 0-100000"))]
    pub gear_score: Option<i32>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl UpdateReviewRequest {
    /// The review changes carried by this request
    pub fn to_update(&self) -> ReviewUpdate {
        ReviewUpdate {
            has_vod: self.has_vod,
            gear_checked: self.gear_checked,
            refresh_vod_date: self.refresh_vod_date,
            refresh_gear_date: self.refresh_gear_date,
            gear_score: self.gear_score,
            notes: self.notes.clone(),
        }
    }
}
