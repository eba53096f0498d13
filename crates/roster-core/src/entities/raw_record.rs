//! Raw record - the persisted per-member attributes, in domain field names
//!
//! Store adapters map their own column names into this shape; nothing
//! downstream of the adapter sees storage field names.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Persisted attributes for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub member_id: Snowflake,
    pub affiliation: Option<String>,
    pub class: Option<String>,
    pub primary_weapon: Option<String>,
    pub secondary_weapon: Option<String>,
    pub registered_name: Option<String>,
    pub review: Option<ReviewRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawRecord {
    /// Create an empty record for a member
    pub fn new(member_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            member_id,
            affiliation: None,
            class: None,
            primary_weapon: None,
            secondary_weapon: None,
            registered_name: None,
            review: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    pub fn with_registered_name(mut self, name: impl Into<String>) -> Self {
        self.registered_name = Some(name.into());
        self
    }

    pub fn with_weapons(mut self, primary: Option<&str>, secondary: Option<&str>) -> Self {
        self.primary_weapon = primary.map(str::to_string);
        self.secondary_weapon = secondary.map(str::to_string);
        self
    }

    /// Affiliation, treating blank values as absent
    pub fn affiliation(&self) -> Option<&str> {
        non_blank(self.affiliation.as_deref())
    }

    /// Check if the member is affiliated
    #[inline]
    pub fn has_affiliation(&self) -> bool {
        self.affiliation().is_some()
    }

    /// Registered name, treating blank values as absent
    pub fn registered_name(&self) -> Option<&str> {
        non_blank(self.registered_name.as_deref())
    }

    /// Both weapon slots combined into a single display value
    pub fn weapon_names(&self) -> Option<String> {
        combine_weapon_names(
            non_blank(self.primary_weapon.as_deref()),
            non_blank(self.secondary_weapon.as_deref()),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Combine two weapon slots: `None` if neither is set, the set one if only
/// one is, otherwise `"primary/secondary"`.
pub fn combine_weapon_names(primary: Option<&str>, secondary: Option<&str>) -> Option<String> {
    match (primary, secondary) {
        (None, None) => None,
        (Some(p), None) => Some(p.to_string()),
        (None, Some(s)) => Some(s.to_string()),
        (Some(p), Some(s)) => Some(format!("{p}/{s}")),
    }
}

/// Review metadata kept alongside a member record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub has_vod: bool,
    /// M/D/YY, empty when not checked
    pub vod_check_date: String,
    pub gear_checked: bool,
    /// M/D/YY, empty when not checked
    pub gear_check_date: String,
    pub gear_score: i32,
    pub notes: String,
}

/// A partial change to a member's review data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default)]
    pub has_vod: Option<bool>,
    #[serde(default)]
    pub gear_checked: Option<bool>,
    #[serde(default)]
    pub refresh_vod_date: bool,
    #[serde(default)]
    pub refresh_gear_date: bool,
    #[serde(default)]
    pub gear_score: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReviewUpdate {
    /// Check if the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.has_vod.is_none()
            && self.gear_checked.is_none()
            && !self.refresh_vod_date
            && !self.refresh_gear_date
            && self.gear_score.is_none()
            && self.notes.is_none()
    }
}

/// Format a date the way review dates are stored (M/D/YY)
pub fn format_review_date(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year().rem_euclid(100))
}

impl ReviewRecord {
    /// Apply an update, stamping check dates with `today`
    ///
    /// Setting a check flag to true stamps today's date and setting it to
    /// false clears the date. A date refresh is only allowed while the flag
    /// (after this update's own flag change) is true.
    pub fn apply(&self, update: &ReviewUpdate, today: NaiveDate) -> Result<Self, DomainError> {
        let stamp = format_review_date(today);
        let mut next = self.clone();

        if let Some(has_vod) = update.has_vod {
            next.has_vod = has_vod;
            next.vod_check_date = if has_vod { stamp.clone() } else { String::new() };
        }
        if update.refresh_vod_date {
            if !next.has_vod {
                return Err(DomainError::ReviewDateRefreshRejected("VOD"));
            }
            next.vod_check_date.clone_from(&stamp);
        }

        if let Some(gear_checked) = update.gear_checked {
            next.gear_checked = gear_checked;
            next.gear_check_date = if gear_checked { stamp.clone() } else { String::new() };
        }
        if update.refresh_gear_date {
            if !next.gear_checked {
                return Err(DomainError::ReviewDateRefreshRejected("gear"));
            }
            next.gear_check_date = stamp;
        }

        if let Some(score) = update.gear_score {
            if score < 0 {
                return Err(DomainError::ValidationError(
                    "Gear score cannot be negative".to_string(),
                ));
            }
            next.gear_score = score;
        }
        if let Some(notes) = &update.notes {
            next.notes = notes.trim().to_string();
        }

        Ok(next)
    }
}
