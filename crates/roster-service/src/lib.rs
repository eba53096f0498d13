//! # roster-service
//!
//! Application layer: the roster reconciliation engine, its schedulers,
//! event ingestion, commands, and DTOs.

pub mod dto;
pub mod services;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use services::{
    CommandService, IngestService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, ShutdownSignal,
};

pub use dto::*;
