//! Pong Ladder - table tennis ladder with replayed Elo ratings
//!
//! This crate keeps a roster and a match history, replays every match in
//! chronological order to derive Elo ratings and win/loss records, and
//! serves the resulting leaderboard over HTTP.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use dashboard::{compute_dashboard, DashboardSummary};
pub use rating::{compute_rankings, RatingCalculator, RatingEngine};
pub use store::{InMemoryLadderStore, LadderSnapshot, LadderStore, SeedDocument};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
