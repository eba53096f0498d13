//! Command handlers
//!
//! Member and officer commands relayed from the platform.

use axum::{extract::State, Json};
use roster_service::{
    CommandService, LookupInfoRequest, MemberInfoResponse, OverrideNameRequest, ReviewSummary,
    SetNameRequest, SetNameResponse, UpdateReviewRequest,
};

use crate::extractors::{JsonBody, RelayAuth, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Register the invoking member's in-game name
///
/// POST /commands/set-name
pub async fn set_name(
    State(state): State<AppState>,
    _auth: RelayAuth,
    ValidatedJson(request): ValidatedJson<SetNameRequest>,
) -> ApiResult<Json<SetNameResponse>> {
    let service = CommandService::new(state.service_context());
    let response = service.set_name(request.member_id, &request.name).await?;
    Ok(Json(response))
}

/// Set another member's name (officers only)
///
/// POST /commands/override-name
pub async fn override_name(
    State(state): State<AppState>,
    _auth: RelayAuth,
    ValidatedJson(request): ValidatedJson<OverrideNameRequest>,
) -> ApiResult<Json<SetNameResponse>> {
    let service = CommandService::new(state.service_context());
    let response = service
        .override_name(&request.actor_roles, request.target_id, &request.name)
        .await?;
    Ok(Json(response))
}

/// POST /commands/lookup-info
pub async fn lookup_info(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(request): JsonBody<LookupInfoRequest>,
) -> ApiResult<Json<MemberInfoResponse>> {
    let service = CommandService::new(state.service_context());
    let info = service
        .lookup_info(request.requester_id, request.target_id)
        .await?;
    Ok(Json(info))
}

/// Update a member's VOD/gear review (officers only)
///
/// POST /commands/update-review
pub async fn update_review(
    State(state): State<AppState>,
    _auth: RelayAuth,
    ValidatedJson(request): ValidatedJson<UpdateReviewRequest>,
) -> ApiResult<Json<ReviewSummary>> {
    let service = CommandService::new(state.service_context());
    let review = service
        .update_review(&request.actor_roles, request.target_id, &request.to_update())
        .await?;
    Ok(Json(review))
}
