//! Usage dashboard aggregates
//!
//! Simple reductions over the current match list for display. They hold no
//! state and are recomputed together with the rankings.

use crate::types::{Match, PlayerStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Final score and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFrequency {
    /// Higher score first, e.g. "3-1"
    pub score: String,
    pub count: usize,
}

/// Unordered player pair and how often they met
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingFrequency {
    pub players: (String, String),
    pub count: usize,
}

/// Descriptive statistics shown next to the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_matches: usize,
    pub total_sets: u64,
    pub average_sets_per_match: f64,
    pub most_common_score: Option<ScoreFrequency>,
    pub most_common_pairing: Option<PairingFrequency>,
    pub top_player: Option<PlayerStats>,
}

/// Score key with the higher number first
pub fn score_key(m: &Match) -> String {
    let (hi, lo) = if m.score1 >= m.score2 {
        (m.score1, m.score2)
    } else {
        (m.score2, m.score1)
    };
    format!("{}-{}", hi, lo)
}

/// Pair key independent of which side each player was on
pub fn pairing_key(m: &Match) -> (String, String) {
    if m.player1 <= m.player2 {
        (m.player1.clone(), m.player2.clone())
    } else {
        (m.player2.clone(), m.player1.clone())
    }
}

/// Most frequent key; ties go to the smallest key so the result is stable
fn most_frequent<K: Ord + Clone + std::hash::Hash>(counts: &HashMap<K, usize>) -> Option<(K, usize)> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(k, c)| (k.clone(), *c))
}

/// Compute the dashboard from the match list and already-ranked stats.
///
/// Matches with the same name on both sides are left out, as in the replay.
pub fn compute_dashboard(matches: &[Match], rankings: &[PlayerStats]) -> DashboardSummary {
    let counted: Vec<&Match> = matches.iter().filter(|m| m.player1 != m.player2).collect();
    let total_matches = counted.len();
    let total_sets: u64 = counted
        .iter()
        .map(|m| u64::from(m.score1) + u64::from(m.score2))
        .sum();
    let average_sets_per_match = if total_matches == 0 {
        0.0
    } else {
        total_sets as f64 / total_matches as f64
    };

    let mut scores: HashMap<String, usize> = HashMap::new();
    let mut pairings: HashMap<(String, String), usize> = HashMap::new();
    for m in &counted {
        *scores.entry(score_key(m)).or_default() += 1;
        *pairings.entry(pairing_key(m)).or_default() += 1;
    }

    DashboardSummary {
        total_matches,
        total_sets,
        average_sets_per_match,
        most_common_score: most_frequent(&scores)
            .map(|(score, count)| ScoreFrequency { score, count }),
        most_common_pairing: most_frequent(&pairings)
            .map(|(players, count)| PairingFrequency { players, count }),
        top_player: rankings.first().cloned(),
    }
}
