//! Route handlers
//!
//! HTTP request handlers organized by concern.

pub mod commands;
pub mod events;
pub mod health;
pub mod roster;
