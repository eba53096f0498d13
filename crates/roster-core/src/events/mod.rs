//! Inbound roster events

mod roster_event;

pub use roster_event::{ConversationEvent, MemberRemovedEvent, MemberUpdatedEvent, RosterEvent};
