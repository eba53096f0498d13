//! Event handlers
//!
//! Platform events forwarded by the relay. Payloads only say which member
//! to re-reconcile; the engine reads persisted attributes from the store.

use axum::{extract::State, Json};
use roster_core::{ConversationEvent, MemberRemovedEvent, MemberUpdatedEvent, RosterEvent};
use roster_service::{EventAckResponse, IngestService};
use tracing::debug;

use crate::extractors::{JsonBody, RelayAuth};
use crate::state::AppState;

async fn ingest(state: &AppState, event: RosterEvent) -> Json<EventAckResponse> {
    debug!(event_type = event.event_type(), "Event received");
    let outcome = IngestService::new(state.service_context()).handle(event).await;
    Json(EventAckResponse::from(outcome))
}

/// POST /events/member-updated
pub async fn member_updated(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(event): JsonBody<MemberUpdatedEvent>,
) -> Json<EventAckResponse> {
    ingest(&state, RosterEvent::MemberUpdated(event)).await
}

/// POST /events/member-removed
pub async fn member_removed(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(event): JsonBody<MemberRemovedEvent>,
) -> Json<EventAckResponse> {
    ingest(&state, RosterEvent::MemberRemoved(event)).await
}

/// POST /events/conversation-created
pub async fn conversation_created(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(event): JsonBody<ConversationEvent>,
) -> Json<EventAckResponse> {
    ingest(&state, RosterEvent::ConversationCreated(event)).await
}

/// POST /events/conversation-updated
pub async fn conversation_updated(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(event): JsonBody<ConversationEvent>,
) -> Json<EventAckResponse> {
    ingest(&state, RosterEvent::ConversationUpdated(event)).await
}

/// POST /events/conversation-deleted
pub async fn conversation_deleted(
    State(state): State<AppState>,
    _auth: RelayAuth,
    JsonBody(event): JsonBody<ConversationEvent>,
) -> Json<EventAckResponse> {
    ingest(&state, RosterEvent::ConversationDeleted(event)).await
}
