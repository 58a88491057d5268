//! Metrics collection using Prometheus
//!
//! This module provides metrics for the ladder service: leaderboard
//! recomputes, roster size, and the outcome of writes.

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ladder service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Leaderboard recompute metrics
    leaderboard_metrics: LeaderboardMetrics,

    /// Roster and match write metrics
    write_metrics: WriteMetrics,
}

/// Leaderboard recompute metrics
#[derive(Clone)]
pub struct LeaderboardMetrics {
    /// Total full recomputes
    pub recomputes_total: IntCounter,

    /// Time spent in a single recompute
    pub recompute_duration: Histogram,

    /// Registered players in the latest snapshot
    pub roster_size: IntGauge,

    /// Recorded matches in the latest snapshot
    pub matches_recorded: IntGauge,

    /// Ranked names with no roster entry
    pub ghost_players: IntGauge,

    /// Version of the snapshot behind the current leaderboard
    pub snapshot_version: IntGauge,
}

/// Roster and match write metrics
#[derive(Clone)]
pub struct WriteMetrics {
    /// Match submissions by outcome (recorded, or the rejection code)
    pub submissions_total: IntCounterVec,

    /// Roster operations by operation and status
    pub roster_operations_total: IntCounterVec,

    /// Time spent resolving match text
    pub resolve_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let leaderboard_metrics = LeaderboardMetrics::new(&registry)?;
        let write_metrics = WriteMetrics::new(&registry)?;

        Ok(Self {
            registry,
            leaderboard_metrics,
            write_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get leaderboard metrics
    pub fn leaderboard(&self) -> &LeaderboardMetrics {
        &self.leaderboard_metrics
    }

    /// Get write metrics
    pub fn writes(&self) -> &WriteMetrics {
        &self.write_metrics
    }

    /// Record a completed leaderboard recompute
    pub fn record_recompute(
        &self,
        duration: Duration,
        version: u64,
        players: usize,
        matches: usize,
        ghosts: usize,
    ) {
        let metrics = &self.leaderboard_metrics;
        metrics.recomputes_total.inc();
        metrics.recompute_duration.observe(duration.as_secs_f64());
        metrics.snapshot_version.set(version as i64);
        metrics.roster_size.set(players as i64);
        metrics.matches_recorded.set(matches as i64);
        metrics.ghost_players.set(ghosts as i64);
    }

    /// Record the outcome of a match submission
    pub fn record_submission(&self, outcome: &str) {
        self.write_metrics
            .submissions_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record a roster operation
    pub fn record_roster_operation(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "rejected" };
        self.write_metrics
            .roster_operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Record time spent in the match resolver
    pub fn record_resolve(&self, duration: Duration) {
        self.write_metrics
            .resolve_duration
            .observe(duration.as_secs_f64());
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl LeaderboardMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let recomputes_total = IntCounter::new(
            "pong_ladder_recomputes_total",
            "Total full leaderboard recomputes",
        )?;
        registry.register(Box::new(recomputes_total.clone()))?;

        let recompute_duration = Histogram::with_opts(
            HistogramOpts::new(
                "pong_ladder_recompute_duration_seconds",
                "Time spent replaying the match history",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(recompute_duration.clone()))?;

        let roster_size = IntGauge::new("pong_ladder_roster_size", "Registered players")?;
        registry.register(Box::new(roster_size.clone()))?;

        let matches_recorded =
            IntGauge::new("pong_ladder_matches_recorded", "Recorded matches")?;
        registry.register(Box::new(matches_recorded.clone()))?;

        let ghost_players = IntGauge::new(
            "pong_ladder_ghost_players",
            "Ranked names without a roster entry",
        )?;
        registry.register(Box::new(ghost_players.clone()))?;

        let snapshot_version = IntGauge::new(
            "pong_ladder_snapshot_version",
            "Snapshot version behind the current leaderboard",
        )?;
        registry.register(Box::new(snapshot_version.clone()))?;

        Ok(Self {
            recomputes_total,
            recompute_duration,
            roster_size,
            matches_recorded,
            ghost_players,
            snapshot_version,
        })
    }
}

impl WriteMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let submissions_total = IntCounterVec::new(
            Opts::new("pong_ladder_submissions_total", "Match submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let roster_operations_total = IntCounterVec::new(
            Opts::new(
                "pong_ladder_roster_operations_total",
                "Roster operations by operation and status",
            ),
            &["operation", "status"],
        )?;
        registry.register(Box::new(roster_operations_total.clone()))?;

        let resolve_duration = Histogram::with_opts(HistogramOpts::new(
            "pong_ladder_resolve_duration_seconds",
            "Time spent resolving match text",
        ))?;
        registry.register(Box::new(resolve_duration.clone()))?;

        Ok(Self {
            submissions_total,
            roster_operations_total,
            resolve_duration,
        })
    }
}
