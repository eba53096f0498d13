//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use roster_core::{combine_weapon_names, MemberView, ReviewRecord};

use super::responses::{
    EventAckResponse, MemberInfoResponse, ReviewSummary, RosterEntryResponse,
};
use crate::services::ingest::IngestOutcome;
use crate::services::projection::UpsertOutcome;

// ============================================================================
// Roster Mappers
// ============================================================================

impl From<&MemberView> for RosterEntryResponse {
    fn from(view: &MemberView) -> Self {
        Self {
            member_id: view.member_id.to_string(),
            username: view.username.clone(),
            display_name: view.display_name.clone(),
            registered_name: view.registered_name.clone(),
            affiliation: view.affiliation.clone(),
            class_category: view.class_category.clone(),
            weapon_primary: view.weapon_primary.clone(),
            weapon_secondary: view.weapon_secondary.clone(),
            weapon_role_id: view.weapon_role_id.map(|id| id.to_string()),
            has_open_conversation: view.has_open_conversation,
            last_updated: view.last_updated,
        }
    }
}

// ============================================================================
// Review Mappers
// ============================================================================

impl From<&ReviewRecord> for ReviewSummary {
    fn from(review: &ReviewRecord) -> Self {
        let date = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
        Self {
            has_vod: review.has_vod,
            vod_check_date: date(&review.vod_check_date),
            gear_checked: review.gear_checked,
            gear_check_date: date(&review.gear_check_date),
            gear_score: review.gear_score,
            notes: review.notes.clone(),
        }
    }
}

/// A tracked member together with their review data
#[derive(Debug, Clone)]
pub struct MemberWithReview {
    pub view: MemberView,
    pub review: ReviewRecord,
}

impl From<MemberWithReview> for MemberInfoResponse {
    fn from(data: MemberWithReview) -> Self {
        let MemberWithReview { view, review } = data;
        let weapon = combine_weapon_names(
            view.weapon_primary.as_deref(),
            view.weapon_secondary.as_deref(),
        );
        Self {
            member_id: view.member_id.to_string(),
            username: view.username,
            display_name: view.display_name,
            registered_name: view.registered_name,
            affiliation: view.affiliation,
            class_category: view.class_category,
            weapon,
            has_open_conversation: view.has_open_conversation,
            last_updated: view.last_updated,
            review: ReviewSummary::from(&review),
        }
    }
}

// ============================================================================
// Event Mappers
// ============================================================================

impl From<IngestOutcome> for EventAckResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Ignored(reason) => Self {
                outcome: "ignored",
                reason: Some(reason.as_str()),
                changed: false,
            },
            IngestOutcome::Processed(upsert) => Self {
                outcome: match upsert {
                    UpsertOutcome::Written { .. } => "written",
                    UpsertOutcome::Purged { .. } => "purged",
                    UpsertOutcome::Aborted => "aborted",
                },
                reason: None,
                changed: upsert.changed(),
            },
        }
    }
}
