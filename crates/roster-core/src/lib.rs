//! # roster-core
//!
//! Domain layer containing entities, value objects, the community layout,
//! port traits, and inbound roster events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod layout;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    combine_weapon_names, format_review_date, member_id_from_name, roster_order,
    ConversationContainer, ExportRow, MemberView, PlatformMember, RawRecord, ReviewRecord,
    ReviewUpdate, EXPORT_HEADERS,
};
pub use error::{DomainError, StoreUnavailable};
pub use events::{ConversationEvent, MemberRemovedEvent, MemberUpdatedEvent, RosterEvent};
pub use layout::{ClassCategory, RosterLayout, WeaponRole};
pub use traits::{ExportSink, LookupResult, MemberPlatform, RecordStore, RepoResult};
pub use value_objects::{
    validate_registered_name, ManagedRoleIds, ManagedRoles, NameRejection, Snowflake,
    SnowflakeParseError, MAX_NAME_LENGTH, MIN_NAME_LENGTH,
};
