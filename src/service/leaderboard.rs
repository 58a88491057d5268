//! Leaderboard pipeline
//!
//! Every snapshot the store publishes is replayed from scratch and the result
//! is republished on a watch channel of its own. Readers always get a
//! leaderboard that belongs to exactly one snapshot version.

use crate::dashboard::{compute_dashboard, DashboardSummary};
use crate::metrics::MetricsCollector;
use crate::rating::RatingEngine;
use crate::store::LadderSnapshot;
use crate::types::PlayerStats;
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

/// Ranked table and dashboard for one snapshot version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub version: u64,
    pub computed_at: DateTime<Utc>,
    pub rankings: Vec<PlayerStats>,
    pub dashboard: DashboardSummary,
}

impl Leaderboard {
    /// Number of ranked names without a roster entry
    pub fn ghost_count(&self) -> usize {
        self.rankings.iter().filter(|s| s.is_ghost()).count()
    }
}

pub struct LeaderboardService {
    engine: RatingEngine,
    sender: watch::Sender<Arc<Leaderboard>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl LeaderboardService {
    /// Create the service with a leaderboard for `initial` already published
    pub fn new(
        engine: RatingEngine,
        initial: &LadderSnapshot,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let first = Self::build(&engine, initial, metrics.as_deref());
        let (sender, _) = watch::channel(Arc::new(first));
        Self {
            engine,
            sender,
            metrics,
        }
    }

    fn build(
        engine: &RatingEngine,
        snapshot: &LadderSnapshot,
        metrics: Option<&MetricsCollector>,
    ) -> Leaderboard {
        let started = std::time::Instant::now();
        let rankings = engine.compute_rankings(&snapshot.players, &snapshot.matches);
        let dashboard = compute_dashboard(&snapshot.matches, &rankings);
        let leaderboard = Leaderboard {
            version: snapshot.version,
            computed_at: current_timestamp(),
            rankings,
            dashboard,
        };

        if let Some(metrics) = metrics {
            metrics.record_recompute(
                started.elapsed(),
                snapshot.version,
                snapshot.players.len(),
                snapshot.matches.len(),
                leaderboard.ghost_count(),
            );
        }
        debug!(
            "Recomputed leaderboard for version {} in {:?}",
            snapshot.version,
            started.elapsed()
        );
        leaderboard
    }

    /// Replay a snapshot without publishing the result
    pub fn recompute(&self, snapshot: &LadderSnapshot) -> Leaderboard {
        Self::build(&self.engine, snapshot, self.metrics.as_deref())
    }

    /// Recompute and publish, unless a newer version is already out
    pub fn publish(&self, snapshot: &LadderSnapshot) -> Arc<Leaderboard> {
        let leaderboard = Arc::new(self.recompute(snapshot));
        self.sender.send_if_modified(|current| {
            if leaderboard.version < current.version {
                return false;
            }
            *current = leaderboard.clone();
            true
        });
        self.latest()
    }

    /// Leaderboard for `snapshot`, publishing it first if the background
    /// task has not caught up yet
    pub fn current(&self, snapshot: &LadderSnapshot) -> Arc<Leaderboard> {
        let latest = self.latest();
        if latest.version >= snapshot.version {
            return latest;
        }
        self.publish(snapshot)
    }

    /// Most recently published leaderboard
    pub fn latest(&self) -> Arc<Leaderboard> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Leaderboard>> {
        self.sender.subscribe()
    }

    /// Follow a store's snapshots until the store goes away
    pub fn spawn(self: Arc<Self>, snapshots: watch::Receiver<LadderSnapshot>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Leaderboard task started");
            let mut stream = WatchStream::new(snapshots);
            while let Some(snapshot) = stream.next().await {
                let published = self.publish(&snapshot);
                debug!(
                    "Published leaderboard version {} with {} ranked players",
                    published.version,
                    published.rankings.len()
                );
            }
            info!("Leaderboard task stopped");
        })
    }
}
