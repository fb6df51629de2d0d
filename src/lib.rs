// ABOUTME: Library root for deckhand - the rollout engine and its supporting types.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod context;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod health;
pub mod output;
pub mod progress;
pub mod types;
