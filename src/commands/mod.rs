// ABOUTME: Command module aggregator for the deckhand CLI.
// ABOUTME: Re-exports check, classify, and analyze command handlers.

mod analyze;
mod check;
mod classify;

pub use analyze::analyze;
pub use check::check;
pub use classify::classify;
