//! Classification and managed-flag derivation
//!
//! A pure function of the member's current roles, their record, and whether
//! they have an open review conversation. Never fails: ambiguous role sets
//! are logged and resolved by declaration order.

use roster_core::{ManagedRoles, RawRecord, RosterLayout, Snowflake};
use tracing::warn;

/// Attributes computed for one member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derived {
    pub class_category: Option<String>,
    pub weapon_primary: Option<String>,
    pub weapon_secondary: Option<String>,
    /// Role that produced `weapon_primary`; `None` when the weapons came
    /// from the record
    pub weapon_role_id: Option<Snowflake>,
    /// Managed roles the member should currently carry
    pub flags: ManagedRoles,
}

pub fn derive(
    roles: &[Snowflake],
    record: Option<&RawRecord>,
    has_open_conversation: bool,
    layout: &RosterLayout,
) -> Derived {
    let mut categories = layout
        .class_categories
        .iter()
        .filter(|category| category.matches(roles));
    let class_category = categories.next().map(|category| category.name.clone());
    let extra_categories = categories.count();
    if extra_categories > 0 {
        warn!(
            chosen = ?class_category,
            extra = extra_categories,
            "Member matches several class categories, using the first"
        );
    }

    let weapons: Vec<_> = layout
        .weapon_table()
        .filter(|weapon| roles.contains(&weapon.id))
        .collect();
    if weapons.len() > 1 {
        warn!(count = weapons.len(), "Member holds several weapon roles");
    }

    let (weapon_primary, weapon_secondary, weapon_role_id) = match weapons.as_slice() {
        [] => (
            record.and_then(|r| non_blank(r.primary_weapon.as_deref())),
            record.and_then(|r| non_blank(r.secondary_weapon.as_deref())),
            None,
        ),
        [first, rest @ ..] => (
            Some(first.name.clone()),
            rest.first().map(|second| second.name.clone()),
            Some(first.id),
        ),
    };

    let missing_name = record.and_then(RawRecord::registered_name).is_none();
    let flags = ManagedRoles::from_missing(
        missing_name,
        class_category.is_none(),
        !has_open_conversation,
    );

    Derived {
        class_category,
        weapon_primary,
        weapon_secondary,
        weapon_role_id,
        flags,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
