//! Export row - one line of the tabular roster export

use crate::entities::MemberView;

/// Column headers, in export order
pub const EXPORT_HEADERS: [&str; 9] = [
    "Member ID",
    "Username",
    "Registered Name",
    "Affiliation",
    "Class",
    "Weapon Role ID",
    "Weapon Role",
    "Has Review Thread",
    "Last Updated",
];

/// A flattened, string-only row ready for the export sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow(pub [String; 9]);

impl ExportRow {
    /// Header row
    pub fn header() -> Self {
        Self(EXPORT_HEADERS.map(String::from))
    }

    /// Cells as a plain vector
    pub fn into_cells(self) -> Vec<String> {
        self.0.into()
    }
}

impl From<&MemberView> for ExportRow {
    fn from(view: &MemberView) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self([
            view.member_id.to_string(),
            view.username.clone(),
            opt(&view.registered_name),
            opt(&view.affiliation),
            opt(&view.class_category),
            view.weapon_role_id.map(|id| id.to_string()).unwrap_or_default(),
            opt(&view.weapon_primary),
            if view.has_open_conversation { "Yes" } else { "No" }.to_string(),
            view.last_updated.to_rfc3339(),
        ])
    }
}
