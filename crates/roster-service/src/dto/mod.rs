//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for relayed commands
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{LookupInfoRequest, OverrideNameRequest, SetNameRequest, UpdateReviewRequest};

pub use responses::{
    EventAckResponse, HealthChecks, HealthResponse, MemberInfoResponse,
    ReadinessResponse, ReviewSummary, RosterEntryResponse, SetNameResponse,
};

pub use mappers::MemberWithReview;
