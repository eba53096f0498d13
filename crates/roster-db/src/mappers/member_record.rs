//! RawRecord / ReviewRecord <-> model mappers
//!
//! Storage column names (`guild`, `ingame_name`, ...) stop here.

use roster_core::entities::{RawRecord, ReviewRecord};
use roster_core::value_objects::Snowflake;

use crate::models::{MemberRecordModel, MemberReviewModel};

impl From<MemberRecordModel> for RawRecord {
    fn from(model: MemberRecordModel) -> Self {
        let review = model.has_review.then(|| ReviewRecord {
            has_vod: model.has_vod.unwrap_or_default(),
            vod_check_date: model.vod_check_date.unwrap_or_default(),
            gear_checked: model.gear_checked.unwrap_or_default(),
            gear_check_date: model.gear_check_date.unwrap_or_default(),
            gear_score: model.gear_score.unwrap_or_default(),
            notes: model.notes.unwrap_or_default(),
        });

        RawRecord {
            member_id: Snowflake::new(model.discord_id),
            affiliation: model.guild,
            class: model.class,
            primary_weapon: model.primary_weapon,
            secondary_weapon: model.secondary_weapon,
            registered_name: model.ingame_name,
            review,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<MemberReviewModel> for ReviewRecord {
    fn from(model: MemberReviewModel) -> Self {
        ReviewRecord {
            has_vod: model.has_vod,
            vod_check_date: model.vod_check_date,
            gear_checked: model.gear_checked,
            gear_check_date: model.gear_check_date,
            gear_score: model.gear_score,
            notes: model.notes,
        }
    }
}
