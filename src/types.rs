//! Common types used throughout the ladder service

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for registered players, assigned by the store
pub type PlayerId = String;

/// Unique identifier for recorded matches, assigned by the store
pub type MatchId = String;

/// Milliseconds since the Unix epoch
pub type TimestampMs = i64;

/// Category label given to stats entries synthesized for unknown names
pub const GHOST_CATEGORY: &str = "?";

/// Nickname given to stats entries synthesized for unknown names
pub const GHOST_NICKNAME: &str = "Unknown";

/// Skill/age bracket of a registered player. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Elite,
    Advanced,
    Intermediate,
    Beginner,
    Junior,
    Senior,
    Veteran,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Elite,
        Category::Advanced,
        Category::Intermediate,
        Category::Beginner,
        Category::Junior,
        Category::Senior,
        Category::Veteran,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Elite => "Elite",
            Category::Advanced => "Advanced",
            Category::Intermediate => "Intermediate",
            Category::Beginner => "Beginner",
            Category::Junior => "Junior",
            Category::Senior => "Senior",
            Category::Veteran => "Veteran",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::error::LadderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::LadderError::InvalidPlayer {
                reason: format!("Unknown category: {}", s),
            })
    }
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Display name and join key into match records
    pub full_name: String,
    /// Alternate names, only used when resolving free text
    pub nicknames: Vec<String>,
    pub category: Category,
}

/// Fields supplied when registering or editing a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub full_name: String,
    pub nicknames: Vec<String>,
    pub category: Category,
}

impl NewPlayer {
    pub fn into_player(self, id: PlayerId) -> Player {
        Player {
            id,
            full_name: self.full_name,
            nicknames: self.nicknames,
            category: self.category,
        }
    }
}

/// A recorded match result. Participants are referenced by full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub player1: String,
    pub player2: String,
    pub score1: u32,
    pub score2: u32,
    pub timestamp: TimestampMs,
}

/// A validated match that has not been assigned an identifier yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub player1: String,
    pub player2: String,
    pub score1: u32,
    pub score2: u32,
    pub timestamp: TimestampMs,
}

impl NewMatch {
    pub fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            player1: self.player1,
            player2: self.player2,
            score1: self.score1,
            score2: self.score2,
            timestamp: self.timestamp,
        }
    }
}

/// Result of a single match from player 1's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Player1Win,
    Player2Win,
    Draw,
}

impl MatchOutcome {
    pub fn from_scores(score1: u32, score2: u32) -> Self {
        match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => MatchOutcome::Player1Win,
            std::cmp::Ordering::Less => MatchOutcome::Player2Win,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }
}

impl From<&Match> for MatchOutcome {
    fn from(m: &Match) -> Self {
        MatchOutcome::from_scores(m.score1, m.score2)
    }
}

/// Derived per-player standings. Recomputed on every replay, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub name: String,
    pub nicknames: Vec<String>,
    /// Category label, or `"?"` for names missing from the roster
    pub category: String,
    pub rating: i64,
    pub wins: u32,
    pub losses: u32,
    pub matches_played: u32,
}

impl PlayerStats {
    pub fn from_player(player: &Player, baseline: i64) -> Self {
        Self {
            name: player.full_name.clone(),
            nicknames: player.nicknames.clone(),
            category: player.category.as_str().to_string(),
            rating: baseline,
            wins: 0,
            losses: 0,
            matches_played: 0,
        }
    }

    /// Stats entry for a name that appears in match history but not in the roster
    pub fn ghost(name: &str, baseline: i64) -> Self {
        Self {
            name: name.to_string(),
            nicknames: vec![GHOST_NICKNAME.to_string()],
            category: GHOST_CATEGORY.to_string(),
            rating: baseline,
            wins: 0,
            losses: 0,
            matches_played: 0,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.category == GHOST_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_from_label() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("  junior ".parse::<Category>().unwrap(), Category::Junior);
        assert!("Grandmaster".parse::<Category>().is_err());
    }

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(MatchOutcome::from_scores(3, 1), MatchOutcome::Player1Win);
        assert_eq!(MatchOutcome::from_scores(0, 3), MatchOutcome::Player2Win);
        assert_eq!(MatchOutcome::from_scores(2, 2), MatchOutcome::Draw);
    }

    #[test]
    fn test_player_json_uses_camel_case() {
        let player = Player {
            id: "p1".to_string(),
            full_name: "Alice Smith".to_string(),
            nicknames: vec!["Ali".to_string()],
            category: Category::Advanced,
        };
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["fullName"], "Alice Smith");
        assert_eq!(json["category"], "Advanced");
    }

    #[test]
    fn test_ghost_stats() {
        let ghost = PlayerStats::ghost("Ghost", 1200);
        assert!(ghost.is_ghost());
        assert_eq!(ghost.nicknames, vec!["Unknown".to_string()]);
        assert_eq!(ghost.rating, 1200);
    }
}
