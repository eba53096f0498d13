//! Database models - SQLx-compatible structs for PostgreSQL tables

mod member_record;

pub use member_record::{MemberRecordModel, MemberReviewModel};
