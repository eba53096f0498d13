//! Roster snapshot handler

use axum::{extract::State, Json};
use roster_core::roster_order;
use roster_service::RosterEntryResponse;

use crate::extractors::RelayAuth;
use crate::state::AppState;

/// Current projection in export order
///
/// GET /roster
pub async fn get_roster(
    State(state): State<AppState>,
    _auth: RelayAuth,
) -> Json<Vec<RosterEntryResponse>> {
    let mut views = state.service_context().projection().all();
    views.sort_by(roster_order);
    Json(views.iter().map(RosterEntryResponse::from).collect())
}
