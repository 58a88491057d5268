//! Rating system using a replayed Elo calculation
//!
//! This module provides the per-match rating calculator and the engine that
//! replays the full match history into a ranked player table.

pub mod calculator;
pub mod elo;
pub mod engine;

// Re-export commonly used types
pub use calculator::{RatingCalculator, RatingUpdate};
pub use elo::{EloRatingCalculator, ExtendedEloConfig};
pub use engine::{compute_rankings, RatingEngine};
