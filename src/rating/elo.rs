//! Elo rating calculator
//!
//! Wraps the skillratings Elo implementation. Ratings are kept as integers:
//! every update is rounded (half away from zero) before it is committed, so
//! rounding error accumulates across a replay exactly as it is observed.

use crate::rating::calculator::{RatingCalculator, RatingUpdate};
use crate::types::MatchOutcome;
use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, EloConfig, EloRating};
use skillratings::Outcomes;

/// Baseline rating for players without history
pub const DEFAULT_BASELINE: i64 = 1200;

/// Default K-factor
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Elo configuration plus the baseline rating for new players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedEloConfig {
    pub elo_config: EloConfig,
    pub initial_rating: i64,
}

impl Default for ExtendedEloConfig {
    fn default() -> Self {
        Self {
            elo_config: EloConfig {
                k: DEFAULT_K_FACTOR,
            },
            initial_rating: DEFAULT_BASELINE,
        }
    }
}

impl ExtendedEloConfig {
    pub fn new(initial_rating: i64, k_factor: f64) -> Self {
        Self {
            elo_config: EloConfig { k: k_factor },
            initial_rating,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.elo_config.k.is_finite() || self.elo_config.k <= 0.0 {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "K-factor must be a positive number".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Elo rating calculator implementation
#[derive(Debug, Clone)]
pub struct EloRatingCalculator {
    config: ExtendedEloConfig,
}

impl EloRatingCalculator {
    /// Create a new Elo rating calculator
    pub fn new(config: ExtendedEloConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Probability-like expected score of player 1 against player 2
    pub fn expected_score(&self, rating1: i64, rating2: i64) -> f64 {
        let (expected, _) = skillratings::elo::expected_score(
            &EloRating {
                rating: rating1 as f64,
            },
            &EloRating {
                rating: rating2 as f64,
            },
        );
        expected
    }
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            config: ExtendedEloConfig::default(),
        }
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn initial_rating(&self) -> i64 {
        self.config.initial_rating
    }

    fn rate_match(&self, rating1: i64, rating2: i64, outcome: MatchOutcome) -> RatingUpdate {
        let one = EloRating {
            rating: rating1 as f64,
        };
        let two = EloRating {
            rating: rating2 as f64,
        };
        let outcome = match outcome {
            MatchOutcome::Player1Win => Outcomes::WIN,
            MatchOutcome::Player2Win => Outcomes::LOSS,
            MatchOutcome::Draw => Outcomes::DRAW,
        };

        // skillratings computes both sides from the pre-match pair
        let (new_one, new_two) = elo(&one, &two, &outcome, &self.config.elo_config);

        RatingUpdate {
            player1: new_one.rating.round() as i64,
            player2: new_two.rating.round() as i64,
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "k_factor": self.config.elo_config.k,
            "initial_rating": self.config.initial_rating,
        })
    }
}
