//! Domain entities - core business objects

mod conversation;
mod export_row;
mod member_view;
mod platform_member;
mod raw_record;

pub use conversation::{member_id_from_name, ConversationContainer};
pub use export_row::{ExportRow, EXPORT_HEADERS};
pub use member_view::{roster_order, MemberView};
pub use platform_member::PlatformMember;
pub use raw_record::{
    combine_weapon_names, format_review_date, RawRecord, ReviewRecord, ReviewUpdate,
};
