//! Replay-based rating engine
//!
//! Turns the full roster and match list into a ranked table. Every call is a
//! complete recompute: matches are replayed in timestamp order from a baseline
//! rating, and nothing is carried over between calls.

use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::EloRatingCalculator;
use crate::types::{Match, MatchOutcome, Player, PlayerStats};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rating engine that replays match history through a calculator
#[derive(Clone)]
pub struct RatingEngine {
    calculator: Arc<dyn RatingCalculator>,
}

impl std::fmt::Debug for RatingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingEngine")
            .field("calculator", &self.calculator.config())
            .finish()
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(Arc::new(EloRatingCalculator::default()))
    }
}

/// Stats table under construction, keyed by exact full name
struct StatsTable {
    entries: Vec<PlayerStats>,
    index: HashMap<String, usize>,
    baseline: i64,
}

impl StatsTable {
    fn new(baseline: i64, capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            baseline,
        }
    }

    fn add_player(&mut self, player: &Player) {
        if self.index.contains_key(&player.full_name) {
            warn!(
                "Duplicate roster name '{}' ignored during replay",
                player.full_name
            );
            return;
        }
        self.index
            .insert(player.full_name.clone(), self.entries.len());
        self.entries
            .push(PlayerStats::from_player(player, self.baseline));
    }

    /// Position of the entry for `name`, synthesizing a ghost if needed
    fn resolve(&mut self, name: &str) -> usize {
        if let Some(&position) = self.index.get(name) {
            return position;
        }
        debug!("Synthesizing ghost entry for '{}'", name);
        let position = self.entries.len();
        self.index.insert(name.to_string(), position);
        self.entries.push(PlayerStats::ghost(name, self.baseline));
        position
    }
}

impl RatingEngine {
    /// Create an engine backed by the given calculator
    pub fn new(calculator: Arc<dyn RatingCalculator>) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &Arc<dyn RatingCalculator> {
        &self.calculator
    }

    /// Compute the ranked stats table for a roster and its match history.
    ///
    /// The order of `matches` does not matter; they are replayed by ascending
    /// timestamp, keeping input order for equal timestamps. Names missing from
    /// the roster get a ghost entry that persists for the rest of the replay.
    /// The result is sorted by rating, highest first, then by name.
    pub fn compute_rankings(&self, roster: &[Player], matches: &[Match]) -> Vec<PlayerStats> {
        let mut table = StatsTable::new(self.calculator.initial_rating(), roster.len());
        for player in roster {
            table.add_player(player);
        }

        let mut ordered: Vec<&Match> = matches.iter().collect();
        ordered.sort_by_key(|m| m.timestamp);

        for m in ordered {
            let first = table.resolve(&m.player1);
            let second = table.resolve(&m.player2);

            if first == second {
                warn!(
                    "Skipping match {} with the same player on both sides: '{}'",
                    m.id, m.player1
                );
                continue;
            }

            let outcome = MatchOutcome::from(m);
            let update = self.calculator.rate_match(
                table.entries[first].rating,
                table.entries[second].rating,
                outcome,
            );

            match outcome {
                MatchOutcome::Player1Win => {
                    table.entries[first].wins += 1;
                    table.entries[second].losses += 1;
                }
                MatchOutcome::Player2Win => {
                    table.entries[first].losses += 1;
                    table.entries[second].wins += 1;
                }
                MatchOutcome::Draw => {}
            }

            let p1 = &mut table.entries[first];
            p1.rating = update.player1;
            p1.matches_played += 1;

            let p2 = &mut table.entries[second];
            p2.rating = update.player2;
            p2.matches_played += 1;
        }

        let mut rankings = table.entries;
        rankings.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
        rankings
    }
}

/// Compute rankings with the default Elo calculator (baseline 1200, K = 32)
pub fn compute_rankings(roster: &[Player], matches: &[Match]) -> Vec<PlayerStats> {
    RatingEngine::default().compute_rankings(roster, matches)
}
