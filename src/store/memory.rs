//! In-memory ladder store
//!
//! Keeps the current snapshot inside a watch channel. Every mutation builds
//! the next roster and match list off to the side and swaps them in as a
//! single commit, so subscribers only ever see complete states.

use crate::error::LadderError;
use crate::store::{LadderSnapshot, LadderStore, SeedDocument};
use crate::types::{Match, MatchId, NewMatch, NewPlayer, Player, PlayerId};
use crate::utils::{generate_match_id, generate_player_id, names_match};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// In-memory store implementation
#[derive(Debug)]
pub struct InMemoryLadderStore {
    sender: watch::Sender<LadderSnapshot>,
}

impl InMemoryLadderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_seed(SeedDocument::default())
    }

    /// Create a store holding the players and matches of a seed document
    pub fn from_seed(seed: SeedDocument) -> Self {
        info!(
            "Seeding ladder store with {} players and {} matches",
            seed.players.len(),
            seed.matches.len()
        );
        let (sender, _) = watch::channel(LadderSnapshot {
            version: 0,
            players: Arc::new(seed.players),
            matches: Arc::new(seed.matches),
        });
        Self { sender }
    }

    /// Apply a mutation as one commit. Nothing is published if it fails.
    fn commit<T, F>(&self, mutation: F) -> crate::error::Result<T>
    where
        F: FnOnce(&mut Vec<Player>, &mut Vec<Match>) -> crate::error::Result<T>,
    {
        let mut outcome = None;
        self.sender.send_if_modified(|snapshot| {
            let mut players = snapshot.players.as_ref().clone();
            let mut matches = snapshot.matches.as_ref().clone();
            match mutation(&mut players, &mut matches) {
                Ok(value) => {
                    snapshot.version += 1;
                    snapshot.players = Arc::new(players);
                    snapshot.matches = Arc::new(matches);
                    debug!("Committed ladder snapshot version {}", snapshot.version);
                    outcome = Some(Ok(value));
                    true
                }
                Err(e) => {
                    outcome = Some(Err(e));
                    false
                }
            }
        });

        outcome.unwrap_or_else(|| {
            Err(LadderError::InternalError {
                message: "Store mutation did not run".to_string(),
            }
            .into())
        })
    }
}

impl Default for InMemoryLadderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_unique_name(
    players: &[Player],
    name: &str,
    except: Option<&PlayerId>,
) -> crate::error::Result<()> {
    let taken = players
        .iter()
        .filter(|p| Some(&p.id) != except)
        .any(|p| names_match(&p.full_name, name));
    if taken {
        return Err(LadderError::DuplicatePlayer {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

#[async_trait]
impl LadderStore for InMemoryLadderStore {
    async fn snapshot(&self) -> crate::error::Result<LadderSnapshot> {
        Ok(self.sender.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<LadderSnapshot> {
        self.sender.subscribe()
    }

    async fn get_player(&self, player_id: &PlayerId) -> crate::error::Result<Option<Player>> {
        Ok(self
            .sender
            .borrow()
            .players
            .iter()
            .find(|p| &p.id == player_id)
            .cloned())
    }

    async fn insert_player(&self, player: NewPlayer) -> crate::error::Result<Player> {
        self.commit(|players, _| {
            ensure_unique_name(players, &player.full_name, None)?;
            let player = player.into_player(generate_player_id());
            players.push(player.clone());
            Ok(player)
        })
    }

    async fn update_player(
        &self,
        player_id: &PlayerId,
        player: NewPlayer,
    ) -> crate::error::Result<Player> {
        self.commit(|players, _| {
            ensure_unique_name(players, &player.full_name, Some(player_id))?;
            let slot = players
                .iter_mut()
                .find(|p| &p.id == player_id)
                .ok_or_else(|| LadderError::PlayerNotFound {
                    player_id: player_id.clone(),
                })?;
            *slot = player.into_player(player_id.clone());
            Ok(slot.clone())
        })
    }

    async fn remove_player(&self, player_id: &PlayerId) -> crate::error::Result<bool> {
        let result = self.commit(|players, _| {
            let before = players.len();
            players.retain(|p| &p.id != player_id);
            if players.len() == before {
                return Err(LadderError::PlayerNotFound {
                    player_id: player_id.clone(),
                }
                .into());
            }
            Ok(())
        });
        not_found_as_false(result)
    }

    async fn insert_match(&self, new_match: NewMatch) -> crate::error::Result<Match> {
        self.commit(|_, matches| {
            let recorded = new_match.into_match(generate_match_id());
            matches.push(recorded.clone());
            Ok(recorded)
        })
    }

    async fn remove_match(&self, match_id: &MatchId) -> crate::error::Result<bool> {
        let result = self.commit(|_, matches| {
            let before = matches.len();
            matches.retain(|m| &m.id != match_id);
            if matches.len() == before {
                return Err(LadderError::MatchNotFound {
                    match_id: match_id.clone(),
                }
                .into());
            }
            Ok(())
        });
        not_found_as_false(result)
    }
}

/// Removing something absent is not an error at the store level
fn not_found_as_false(result: crate::error::Result<()>) -> crate::error::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) => match e.downcast_ref::<LadderError>() {
            Some(LadderError::PlayerNotFound { .. }) | Some(LadderError::MatchNotFound { .. }) => {
                Ok(false)
            }
            _ => Err(e),
        },
    }
}
