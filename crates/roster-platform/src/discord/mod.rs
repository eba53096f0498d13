//! Platform (Discord REST v10) adapter

mod client;
mod models;

pub use client::{merge_roles, subtract_roles, DiscordClient};
