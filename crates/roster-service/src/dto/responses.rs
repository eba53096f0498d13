//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Command Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SetNameResponse {
    pub member_id: String,
    pub registered_name: String,
}

/// Review data as shown to officers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub has_vod: bool,
    /// M/D/YY, absent when never checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vod_check_date: Option<String>,
    pub gear_checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_check_date: Option<String>,
    pub gear_score: i32,
    pub notes: String,
}

/// Answer to an info lookup
#[derive(Debug, Clone, Serialize)]
pub struct MemberInfoResponse {
    pub member_id: String,
    pub username: String,
    pub display_name: String,
    pub registered_name: Option<String>,
    pub affiliation: Option<String>,
    pub class_category: Option<String>,
    /// Both weapon slots combined, e.g. "SnS/GS" or "Bow/Dagger"
    pub weapon: Option<String>,
    pub has_open_conversation: bool,
    pub last_updated: DateTime<Utc>,
    pub review: ReviewSummary,
}

// ============================================================================
// Roster Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntryResponse {
    pub member_id: String,
    pub username: String,
    pub display_name: String,
    pub registered_name: Option<String>,
    pub affiliation: Option<String>,
    pub class_category: Option<String>,
    pub weapon_primary: Option<String>,
    pub weapon_secondary: Option<String>,
    pub weapon_role_id: Option<String>,
    pub has_open_conversation: bool,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Event Responses
// ============================================================================

/// Acknowledgement for a relayed platform event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAckResponse {
    /// "ignored", "written", "purged", or "aborted"
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub changed: bool,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Engine state reported by the readiness probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub record_store: String,
    pub tracked_members: usize,
    pub open_conversations: usize,
    pub last_export: Option<DateTime<Utc>>,
}

impl ReadinessResponse {
    pub fn ready(
        store_healthy: bool,
        tracked_members: usize,
        open_conversations: usize,
        last_export: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status: if store_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                record_store: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
                tracked_members,
                open_conversations,
                last_export,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_summary_omits_empty_dates() {
        let summary = ReviewSummary {
            has_vod: true,
            vod_check_date: Some("3/7/25".to_string()),
            gear_checked: false,
            gear_check_date: None,
            gear_score: 0,
            notes: String::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["vod_check_date"], "3/7/25");
        assert!(json.get("gear_check_date").is_none());
    }

    #[test]
    fn test_event_ack_serialization() {
        let ack = EventAckResponse {
            outcome: "ignored",
            reason: Some("managed role change"),
            changed: false,
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert!(json.contains("\"outcome\":\"ignored\""));
        assert!(json.contains("\"reason\":\"managed role change\""));
    }

    #[test]
    fn test_health_responses() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");

        let ready = ReadinessResponse::ready(false, 3, 1, None);
        assert_eq!(ready.status, "not_ready");
        assert_eq!(ready.checks.record_store, "unhealthy");
        assert_eq!(ready.checks.tracked_members, 3);
    }
}
