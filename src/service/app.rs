//! Main application state and service coordination
//!
//! This module contains the AppState that wires the store, the rating engine,
//! the roster and submission services and the leaderboard pipeline together,
//! and owns their background tasks.

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::{EloRatingCalculator, ExtendedEloConfig, RatingEngine};
use crate::service::leaderboard::LeaderboardService;
use crate::service::roster::RosterService;
use crate::service::submission::{MatchResolver, SubmissionService, TextPatternResolver};
use crate::store::{InMemoryLadderStore, LadderStore, SeedDocument};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Roster and match history
    store: Arc<dyn LadderStore>,

    roster: RosterService,
    submissions: SubmissionService,
    leaderboard: Arc<LeaderboardService>,

    /// Metrics shared by every component
    metrics: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application from configuration, loading the seed file
    /// if one is configured
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing {} service", config.service.name);

        let seed = match &config.storage.seed_file {
            Some(path) => {
                info!("Loading seed data from {}", path.display());
                SeedDocument::from_file(path).map_err(|e| ServiceError::Configuration {
                    message: format!("Failed to load seed file {}: {:#}", path.display(), e),
                })?
            }
            None => SeedDocument::default(),
        };

        let store: Arc<dyn LadderStore> = Arc::new(InMemoryLadderStore::from_seed(seed));
        Self::with_components(config, store, Arc::new(TextPatternResolver::new())).await
    }

    /// Initialize the application around an existing store and resolver
    pub async fn with_components(
        config: AppConfig,
        store: Arc<dyn LadderStore>,
        resolver: Arc<dyn MatchResolver>,
    ) -> Result<Self, ServiceError> {
        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let engine = Self::initialize_rating_engine(&config)?;

        let initial = store
            .snapshot()
            .await
            .map_err(|e| ServiceError::Initialization {
                message: format!("Failed to read initial snapshot: {}", e),
            })?;
        info!(
            "Initial snapshot: {} players, {} matches",
            initial.players.len(),
            initial.matches.len()
        );

        let leaderboard = Arc::new(LeaderboardService::new(
            engine,
            &initial,
            Some(metrics.clone()),
        ));
        let roster = RosterService::new(store.clone()).with_metrics(metrics.clone());
        let submissions =
            SubmissionService::new(store.clone(), resolver, config.resolve_timeout())
                .with_metrics(metrics.clone());

        Ok(Self {
            config,
            store,
            roster,
            submissions,
            leaderboard,
            metrics,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    fn initialize_rating_engine(config: &AppConfig) -> Result<RatingEngine, ServiceError> {
        let rating_config = ExtendedEloConfig::from(&config.rating);
        info!(
            "Rating system: Elo, baseline {}, K {}",
            rating_config.initial_rating, rating_config.elo_config.k
        );
        let calculator =
            EloRatingCalculator::new(rating_config).map_err(|e| ServiceError::Configuration {
                message: format!("Failed to initialize rating calculator: {}", e),
            })?;
        Ok(RatingEngine::new(Arc::new(calculator)))
    }

    /// Start background services
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting {} service", self.config.service.name);

        let mut is_running = self.is_running.write().await;
        if *is_running {
            return Err(ServiceError::BackgroundTask {
                message: "Service already started".to_string(),
            });
        }
        *is_running = true;
        drop(is_running);

        let handle = self.leaderboard.clone().spawn(self.store.subscribe());
        self.background_tasks.lock().await.push(handle);

        info!("✅ {} service started", self.config.service.name);
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);

        *self.is_running.write().await = false;
        self.stop_background_tasks().await;

        let snapshot = self
            .store
            .snapshot()
            .await
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to read final snapshot: {}", e),
            })?;
        info!(
            "Final state: version {}, {} players, {} matches",
            snapshot.version,
            snapshot.players.len(),
            snapshot.matches.len()
        );
        info!("✅ {} shutdown completed", self.config.service.name);
        Ok(())
    }

    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);
        for (i, task) in tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Background task {} ended with error: {}", i + 1, e);
                }
            }
        }
        info!("✅ All {} background tasks stopped", task_count);
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn store(&self) -> Arc<dyn LadderStore> {
        self.store.clone()
    }

    pub fn roster(&self) -> &RosterService {
        &self.roster
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }

    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        self.leaderboard.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }
}
