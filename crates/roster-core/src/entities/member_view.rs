//! Member view - the reconciled, current picture of one tracked member

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Reconciled state for one affiliated member
///
/// A view only exists while the member has an affiliation. It is always
/// rebuilt in full from freshly fetched data, never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub member_id: Snowflake,
    pub username: String,
    pub display_name: String,
    pub registered_name: Option<String>,
    pub affiliation: Option<String>,
    pub class_category: Option<String>,
    pub weapon_primary: Option<String>,
    pub weapon_secondary: Option<String>,
    pub weapon_role_id: Option<Snowflake>,
    pub has_open_conversation: bool,
    pub last_updated: DateTime<Utc>,
}

impl MemberView {
    /// Compare everything except `last_updated`
    pub fn same_content(&self, other: &Self) -> bool {
        self.member_id == other.member_id
            && self.username == other.username
            && self.display_name == other.display_name
            && self.registered_name == other.registered_name
            && self.affiliation == other.affiliation
            && self.class_category == other.class_category
            && self.weapon_primary == other.weapon_primary
            && self.weapon_secondary == other.weapon_secondary
            && self.weapon_role_id == other.weapon_role_id
            && self.has_open_conversation == other.has_open_conversation
    }
}

/// Roster order: affiliation, then registered name, absent values last,
/// ties broken by member id
pub fn roster_order(a: &MemberView, b: &MemberView) -> Ordering {
    nulls_last(a.affiliation.as_deref(), b.affiliation.as_deref())
        .then_with(|| nulls_last(a.registered_name.as_deref(), b.registered_name.as_deref()))
        .then_with(|| a.member_id.cmp(&b.member_id))
}

fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
