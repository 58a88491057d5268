//! Rating system configuration

use crate::rating::elo::{ExtendedEloConfig, DEFAULT_BASELINE, DEFAULT_K_FACTOR};
use serde::{Deserialize, Serialize};

/// Rating parameters shared by every replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Rating of a player with no matches
    pub baseline: i64,
    /// Elo K-factor
    pub k_factor: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            k_factor: DEFAULT_K_FACTOR,
        }
    }
}

impl From<&RatingSettings> for ExtendedEloConfig {
    fn from(settings: &RatingSettings) -> Self {
        ExtendedEloConfig::new(settings.baseline, settings.k_factor)
    }
}
