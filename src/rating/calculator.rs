//! Rating calculator trait and a recording implementation for tests
//!
//! A calculator only knows how to move two ratings after one match. Replaying
//! the history and keeping per-player state is the engine's job.

use crate::types::MatchOutcome;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// New ratings for both sides of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub player1: i64,
    pub player2: i64,
}

/// Trait for calculating rating changes after one match
pub trait RatingCalculator: Send + Sync {
    /// Rating assigned to any player with no match history
    fn initial_rating(&self) -> i64;

    /// Compute both new ratings from the pre-match pair.
    ///
    /// Both sides are updated from the same `(rating1, rating2)` input; the
    /// result for player 2 must not depend on player 1's new rating.
    fn rate_match(&self, rating1: i64, rating2: i64, outcome: MatchOutcome) -> RatingUpdate;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Calculator that records every call and leaves ratings unchanged
#[derive(Debug)]
pub struct RecordingRatingCalculator {
    initial_rating: i64,
    calls: Mutex<Vec<(i64, i64, MatchOutcome)>>,
}

impl RecordingRatingCalculator {
    pub fn new(initial_rating: i64) -> Self {
        Self {
            initial_rating,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Get all calls made, in order
    pub fn calls(&self) -> Vec<(i64, i64, MatchOutcome)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for RecordingRatingCalculator {
    fn default() -> Self {
        Self::new(1200)
    }
}

impl RatingCalculator for RecordingRatingCalculator {
    fn initial_rating(&self) -> i64 {
        self.initial_rating
    }

    fn rate_match(&self, rating1: i64, rating2: i64, outcome: MatchOutcome) -> RatingUpdate {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((rating1, rating2, outcome));
        }
        RatingUpdate {
            player1: rating1,
            player2: rating2,
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "recording",
            "initial_rating": self.initial_rating,
        })
    }
}
