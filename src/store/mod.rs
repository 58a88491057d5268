//! Roster and match storage
//!
//! The store stands in for the hosted database: it assigns identifiers, keeps
//! the current roster and match list, and publishes each committed state as
//! one immutable snapshot.

pub mod memory;

pub use memory::InMemoryLadderStore;

use crate::types::{Match, MatchId, NewMatch, NewPlayer, Player, PlayerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// One committed state of the roster and match list.
///
/// Both collections always come from the same commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LadderSnapshot {
    /// Increases by one on every commit
    pub version: u64,
    pub players: Arc<Vec<Player>>,
    pub matches: Arc<Vec<Match>>,
}

/// On-disk seed format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl SeedDocument {
    /// Read a seed document from a JSON file
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read seed file {}: {}", path.display(), e)
        })?;
        let document = serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("Failed to parse seed file {}: {}", path.display(), e)
        })?;
        Ok(document)
    }
}

/// Trait for roster and match persistence
#[async_trait]
pub trait LadderStore: Send + Sync {
    /// Latest committed snapshot
    async fn snapshot(&self) -> crate::error::Result<LadderSnapshot>;

    /// Subscribe to committed snapshots; the receiver starts at the latest one
    fn subscribe(&self) -> watch::Receiver<LadderSnapshot>;

    /// Get a player by identifier
    async fn get_player(&self, player_id: &PlayerId) -> crate::error::Result<Option<Player>>;

    /// Store a new player and return it with its assigned identifier
    async fn insert_player(&self, player: NewPlayer) -> crate::error::Result<Player>;

    /// Overwrite every field of an existing player
    async fn update_player(
        &self,
        player_id: &PlayerId,
        player: NewPlayer,
    ) -> crate::error::Result<Player>;

    /// Remove a player. Matches referencing the name are left untouched.
    async fn remove_player(&self, player_id: &PlayerId) -> crate::error::Result<bool>;

    /// Store a new match and return it with its assigned identifier
    async fn insert_match(&self, new_match: NewMatch) -> crate::error::Result<Match>;

    /// Remove a match
    async fn remove_match(&self, match_id: &MatchId) -> crate::error::Result<bool>;

    /// Get all players
    async fn players(&self) -> crate::error::Result<Arc<Vec<Player>>> {
        Ok(self.snapshot().await?.players)
    }

    /// Get all matches
    async fn matches(&self) -> crate::error::Result<Arc<Vec<Match>>> {
        Ok(self.snapshot().await?.matches)
    }
}
