//! Player registration, editing and removal
//!
//! Validation happens here before anything reaches the store. The store
//! repeats the uniqueness check inside its commit so two concurrent
//! registrations cannot both win.

use crate::error::{LadderError, Result};
use crate::metrics::MetricsCollector;
use crate::store::LadderStore;
use crate::types::{NewPlayer, Player, PlayerId};
use crate::utils::names_match;
use std::sync::Arc;
use tracing::{info, warn};

/// Roster operations over a ladder store
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn LadderStore>,
    metrics: Option<Arc<MetricsCollector>>,
}

/// Trim names and drop blank nicknames, then check the result is usable
pub fn normalize_player(player: NewPlayer) -> Result<NewPlayer> {
    let full_name = player.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(LadderError::InvalidPlayer {
            reason: "Full name cannot be empty".to_string(),
        }
        .into());
    }

    let mut nicknames: Vec<String> = Vec::with_capacity(player.nicknames.len());
    for nickname in player.nicknames {
        let nickname = nickname.trim();
        if !nickname.is_empty() && !nicknames.iter().any(|n| names_match(n, nickname)) {
            nicknames.push(nickname.to_string());
        }
    }
    if nicknames.is_empty() {
        return Err(LadderError::InvalidPlayer {
            reason: format!("Player '{}' needs at least one nickname", full_name),
        }
        .into());
    }

    Ok(NewPlayer {
        full_name,
        nicknames,
        category: player.category,
    })
}

impl RosterService {
    pub fn new(store: Arc<dyn LadderStore>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, operation: &str, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_roster_operation(operation, success);
        }
    }

    async fn ensure_name_available(&self, name: &str, except: Option<&PlayerId>) -> Result<()> {
        let players = self.store.players().await?;
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

    /// Register a new player
    pub async fn register_player(&self, player: NewPlayer) -> Result<Player> {
        let result: Result<Player> = async {
            let player = normalize_player(player)?;
            self.ensure_name_available(&player.full_name, None).await?;
            self.store.insert_player(player).await
        }
        .await;

        match &result {
            Ok(player) => info!(
                "Registered player '{}' ({}) as {}",
                player.full_name, player.category, player.id
            ),
            Err(e) => warn!("Player registration rejected: {}", e),
        }
        self.record("register", result.is_ok());
        result
    }

    /// Rewrite every field of an existing player.
    ///
    /// Matches recorded under the old name keep that name.
    pub async fn edit_player(&self, player_id: &PlayerId, player: NewPlayer) -> Result<Player> {
        let result: Result<Player> = async {
            let player = normalize_player(player)?;
            if self.store.get_player(player_id).await?.is_none() {
                return Err(LadderError::PlayerNotFound {
                    player_id: player_id.clone(),
                }
                .into());
            }
            self.ensure_name_available(&player.full_name, Some(player_id))
                .await?;
            self.store.update_player(player_id, player).await
        }
        .await;

        match &result {
            Ok(player) => info!("Updated player {} -> '{}'", player.id, player.full_name),
            Err(e) => warn!("Player edit rejected for {}: {}", player_id, e),
        }
        self.record("edit", result.is_ok());
        result
    }

    /// Remove a player from the roster. Their matches stay recorded.
    pub async fn delete_player(&self, player_id: &PlayerId) -> Result<()> {
        let removed = self.store.remove_player(player_id).await?;
        self.record("delete", removed);
        if !removed {
            warn!("Delete requested for unknown player {}", player_id);
            return Err(LadderError::PlayerNotFound {
                player_id: player_id.clone(),
            }
            .into());
        }
        info!("Deleted player {}", player_id);
        Ok(())
    }

    /// Current roster
    pub async fn list_players(&self) -> Result<Vec<Player>> {
        Ok(self.store.players().await?.as_ref().clone())
    }
}
