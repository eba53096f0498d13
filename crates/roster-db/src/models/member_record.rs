//! Member record database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `member_records` left-joined with `member_reviews`
///
/// Review columns are all NULL when the member has no review row.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRecordModel {
    pub discord_id: i64,
    pub guild: Option<String>,
    pub class: Option<String>,
    pub primary_weapon: Option<String>,
    pub secondary_weapon: Option<String>,
    pub ingame_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub has_review: bool,
    pub has_vod: Option<bool>,
    pub vod_check_date: Option<String>,
    pub gear_checked: Option<bool>,
    pub gear_check_date: Option<String>,
    pub gear_score: Option<i32>,
    pub notes: Option<String>,
}

/// Database model for the member_reviews table
#[derive(Debug, Clone, FromRow)]
pub struct MemberReviewModel {
    pub discord_id: i64,
    pub has_vod: bool,
    pub vod_check_date: String,
    pub gear_checked: bool,
    pub gear_check_date: String,
    pub gear_score: i32,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}
