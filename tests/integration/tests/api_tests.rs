//! API Integration Tests
//!
//! Each test starts a real HTTP server over the in-memory record store,
//! platform, and export sink, then drives it through the relay endpoints.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    affiliated_record, assert_json, assert_status, conversation_body, member,
    member_removed_body, member_updated_body, unique_member_id, ErrorEnvelope, EventAck,
    MemberInfo, Readiness, ReviewSummary, RosterEntry, SetNameResult, TestServer,
    HEALER_WAND_BOW, MISSING_CLASS, MISSING_CONVERSATION, MISSING_NAME, OFFICER_ROLE,
    TANK_SNS_GS,
};
use reqwest::StatusCode;
use roster_core::Snowflake;
use serde_json::json;

/// Put a member on the platform with a record, then relay an update for them
async fn track(server: &TestServer, id: Snowflake, role_ids: &[i64], affiliation: &str) {
    let platform_member = member(id, role_ids);
    server.platform.insert_member(platform_member.clone());
    server.store.insert(affiliated_record(id, affiliation));

    let response = server
        .post_auth(
            "/api/v1/events/member-updated",
            &member_updated_body(&platform_member, None),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "written");
}

async fn roster(server: &TestServer) -> Vec<RosterEntry> {
    let response = server.get_auth("/api/v1/roster").await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_reports_engine_state() {
    let server = TestServer::start().await.expect("Failed to start server");
    track(&server, unique_member_id(), &[TANK_SNS_GS], "Tsunami").await;

    let response = server.get("/health/ready").await.unwrap();
    let ready: Readiness = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ready.status, "ready");
    assert_eq!(ready.checks.record_store, "healthy");
    assert_eq!(ready.checks.tracked_members, 1);
    assert_eq!(ready.checks.open_conversations, 0);
}

#[tokio::test]
async fn test_health_ready_unavailable_when_store_is_down() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.set_unreachable(true);

    let response = server.get("/health/ready").await.unwrap();
    let ready: Readiness = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(ready.status, "not_ready");
    assert_eq!(ready.checks.record_store, "unhealthy");
}

// ============================================================================
// Relay Auth Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/roster").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_wrong_token_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post_with_token(
            "/api/v1/events/member-removed",
            "not-the-secret",
            &member_removed_body(unique_member_id()),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "INVALID_TOKEN");
}

// ============================================================================
// Event Tests
// ============================================================================

#[tokio::test]
async fn test_member_update_builds_view_and_managed_roles() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let entries = roster(&server).await;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.member_id, id.to_string());
    assert_eq!(entry.affiliation.as_deref(), Some("Tsunami"));
    assert_eq!(entry.class_category.as_deref(), Some("Tank"));
    assert_eq!(entry.weapon_primary.as_deref(), Some("SnS"));
    assert_eq!(entry.weapon_secondary.as_deref(), Some("GS"));
    assert_eq!(entry.weapon_role_id.as_deref(), Some("100"));
    assert!(entry.registered_name.is_none());
    assert!(!entry.has_open_conversation);

    // No name and no conversation yet; the class is covered
    let held = server.platform.roles_of(id);
    assert!(held.contains(&Snowflake::new(MISSING_NAME)));
    assert!(held.contains(&Snowflake::new(MISSING_CONVERSATION)));
    assert!(!held.contains(&Snowflake::new(MISSING_CLASS)));
}

#[tokio::test]
async fn test_managed_only_role_change_is_ignored() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    // The echo of our own role write: only managed roles differ
    let echoed = member(id, &[TANK_SNS_GS, MISSING_NAME, MISSING_CONVERSATION]);
    let response = server
        .post_auth(
            "/api/v1/events/member-updated",
            &member_updated_body(&echoed, Some(&[TANK_SNS_GS])),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "ignored");
    assert_eq!(ack.reason.as_deref(), Some("managed role change"));
    assert!(!ack.changed);
}

#[tokio::test]
async fn test_class_change_is_reconciled() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let switched = member(id, &[HEALER_WAND_BOW]);
    server.platform.insert_member(switched.clone());
    let response = server
        .post_auth(
            "/api/v1/events/member-updated",
            &member_updated_body(&switched, Some(&[TANK_SNS_GS])),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "written");
    assert!(ack.changed);

    let entries = roster(&server).await;
    assert_eq!(entries[0].class_category.as_deref(), Some("Healer"));
    assert_eq!(entries[0].weapon_primary.as_deref(), Some("Wand"));
    assert_eq!(entries[0].weapon_secondary.as_deref(), Some("Bow"));
}

#[tokio::test]
async fn test_member_without_affiliation_is_not_tracked() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    let platform_member = member(id, &[TANK_SNS_GS]);
    server.platform.insert_member(platform_member.clone());

    let response = server
        .post_auth(
            "/api/v1/events/member-updated",
            &member_updated_body(&platform_member, None),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "purged");
    assert!(roster(&server).await.is_empty());
}

#[tokio::test]
async fn test_member_removed_drops_view() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth("/api/v1/events/member-removed", &member_removed_body(id))
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "purged");
    assert!(ack.changed);
    assert!(roster(&server).await.is_empty());
}

#[tokio::test]
async fn test_conversation_lifecycle_updates_flag() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth(
            "/api/v1/events/conversation-created",
            &conversation_body(900, id, false),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(ack.changed);
    assert!(roster(&server).await[0].has_open_conversation);
    assert!(!server
        .platform
        .roles_of(id)
        .contains(&Snowflake::new(MISSING_CONVERSATION)));

    let response = server
        .post_auth(
            "/api/v1/events/conversation-updated",
            &conversation_body(900, id, true),
        )
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(ack.changed);
    assert!(!roster(&server).await[0].has_open_conversation);
    assert!(server
        .platform
        .roles_of(id)
        .contains(&Snowflake::new(MISSING_CONVERSATION)));
}

#[tokio::test]
async fn test_conversation_outside_review_channels_is_ignored() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    let body = json!({
        "community_id": "1",
        "container": {"id": "901", "name": format!("Chat [{id}]"), "parent_id": "71"},
    });

    let response = server
        .post_auth("/api/v1/events/conversation-created", &body)
        .await
        .unwrap();
    let ack: EventAck = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ack.outcome, "ignored");
    assert_eq!(ack.reason.as_deref(), Some("not a review channel"));
    assert_eq!(server.ctx().index().len(), 0);
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
async fn test_set_name_updates_roster() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth(
            "/api/v1/commands/set-name",
            &json!({"member_id": id, "name": "  Kaelthas "}),
        )
        .await
        .unwrap();
    let result: SetNameResult = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.member_id, id.to_string());
    assert_eq!(result.registered_name, "Kaelthas");

    let entries = roster(&server).await;
    assert_eq!(entries[0].registered_name.as_deref(), Some("Kaelthas"));
    assert!(!server
        .platform
        .roles_of(id)
        .contains(&Snowflake::new(MISSING_NAME)));
}

#[tokio::test]
async fn test_set_name_rejections() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth("/api/v1/commands/set-name", &json!({"member_id": id, "name": "A"}))
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_NAME");
    assert_eq!(body.error.message, "Name must be at least 2 characters long");

    // No record at all: not in one of the guilds
    let stranger = unique_member_id();
    let response = server
        .post_auth(
            "/api/v1/commands/set-name",
            &json!({"member_id": stranger, "name": "Stranger"}),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "NOT_AFFILIATED");
}

#[tokio::test]
async fn test_override_name_requires_officer() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth(
            "/api/v1/commands/override-name",
            &json!({"actor_roles": [], "target_id": id, "name": "Renamed"}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/commands/override-name",
            &json!({"actor_roles": [OFFICER_ROLE.to_string()], "target_id": id, "name": "Renamed"}),
        )
        .await
        .unwrap();
    let result: SetNameResult = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.registered_name, "Renamed");
}

#[tokio::test]
async fn test_lookup_info() {
    let server = TestServer::start().await.unwrap();
    let requester = unique_member_id();
    let target = unique_member_id();
    track(&server, requester, &[HEALER_WAND_BOW], "Hurricane").await;
    track(&server, target, &[TANK_SNS_GS], "Tsunami").await;

    let response = server
        .post_auth(
            "/api/v1/commands/lookup-info",
            &json!({"requester_id": requester, "target_id": target}),
        )
        .await
        .unwrap();
    let info: MemberInfo = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(info.member_id, target.to_string());
    assert_eq!(info.affiliation.as_deref(), Some("Tsunami"));
    assert_eq!(info.class_category.as_deref(), Some("Tank"));
    assert_eq!(info.weapon.as_deref(), Some("SnS/GS"));
    assert!(info.registered_name.is_none());
    assert!(!info.has_open_conversation);
    assert!(!info.review.has_vod);

    // Untracked requester
    let response = server
        .post_auth(
            "/api/v1/commands/lookup-info",
            &json!({"requester_id": unique_member_id(), "target_id": target}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    // Untracked target
    let response = server
        .post_auth(
            "/api/v1/commands/lookup-info",
            &json!({"requester_id": requester, "target_id": unique_member_id()}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_update_review_stamps_and_rejects() {
    let server = TestServer::start().await.unwrap();
    let id = unique_member_id();
    track(&server, id, &[TANK_SNS_GS], "Tsunami").await;
    let officer = [OFFICER_ROLE.to_string()];

    // Refreshing a date while the flag is unset is a rule violation
    let response = server
        .post_auth(
            "/api/v1/commands/update-review",
            &json!({"actor_roles": officer, "target_id": id, "refresh_vod_date": true}),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "REVIEW_DATE_REFRESH_REJECTED");

    let response = server
        .post_auth(
            "/api/v1/commands/update-review",
            &json!({
                "actor_roles": officer,
                "target_id": id,
                "has_vod": true,
                "gear_score": 2400,
                "notes": "solid rotations",
            }),
        )
        .await
        .unwrap();
    let review: ReviewSummary = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(review.has_vod);
    assert!(review.vod_check_date.is_some());
    assert!(!review.gear_checked);
    assert!(review.gear_check_date.is_none());
    assert_eq!(review.gear_score, 2400);
    assert_eq!(review.notes, "solid rotations");

    // Out-of-range score fails DTO validation
    let response = server
        .post_auth(
            "/api/v1/commands/update-review",
            &json!({"actor_roles": officer, "target_id": id, "gear_score": -1}),
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

// ============================================================================
// Roster Tests
// ============================================================================

#[tokio::test]
async fn test_roster_sorted_by_affiliation_then_name() {
    let server = TestServer::start().await.unwrap();
    let first = unique_member_id();
    let second = unique_member_id();
    let third = unique_member_id();
    track(&server, first, &[TANK_SNS_GS], "Tsunami").await;
    track(&server, second, &[TANK_SNS_GS], "Avalanche").await;
    track(&server, third, &[HEALER_WAND_BOW], "Avalanche").await;

    server
        .post_auth(
            "/api/v1/commands/set-name",
            &json!({"member_id": third, "name": "Aria"}),
        )
        .await
        .unwrap();
    server
        .post_auth(
            "/api/v1/commands/set-name",
            &json!({"member_id": second, "name": "Zed"}),
        )
        .await
        .unwrap();

    let order: Vec<String> = roster(&server)
        .await
        .into_iter()
        .map(|e| e.member_id)
        .collect();
    assert_eq!(
        order,
        vec![third.to_string(), second.to_string(), first.to_string()]
    );
}
