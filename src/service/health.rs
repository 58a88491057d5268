//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the ladder service,
//! including readiness and liveness probes.

use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

impl HealthStatus {
    /// Combine with another status, keeping the worse of the two
    fn worst(self, other: &HealthStatus) -> HealthStatus {
        match (&self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub players: usize,
    pub matches: usize,
    /// Names on the leaderboard, ghosts included
    pub ranked_players: usize,
    pub ghost_players: usize,
    pub snapshot_version: u64,
    pub leaderboard_version: u64,
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: &AppState) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        for check in [
            Self::check_service_running(app_state).await,
            Self::check_store(app_state).await,
            Self::check_leaderboard(app_state).await,
        ] {
            overall_status = overall_status.worst(&check.status);
            checks.push(check);
        }

        let stats = Self::gather_service_stats(app_state).await;

        Ok(HealthCheck {
            status: overall_status,
            service: app_state.config().service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: &AppState) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle requests
    pub async fn readiness_check(app_state: &AppState) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }
        Ok(Self::check_store(app_state).await.status)
    }

    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn check_store(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match app_state.store().snapshot().await {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Store snapshot check failed: {}", e);
                (
                    HealthStatus::Unhealthy,
                    Some(format!("Snapshot unavailable: {}", e)),
                )
            }
        };

        ComponentCheck {
            name: "ladder_store".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// A leaderboard behind the store is degraded, not failed: it catches up
    /// on the next recompute
    async fn check_leaderboard(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let published = app_state.leaderboard().latest().version;
        let (status, message) = match app_state.store().snapshot().await {
            Ok(snapshot) if snapshot.version > published => (
                HealthStatus::Degraded,
                Some(format!(
                    "Leaderboard at version {} behind store version {}",
                    published, snapshot.version
                )),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
        };

        ComponentCheck {
            name: "leaderboard".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let leaderboard = app_state.leaderboard().latest();
        let mut stats = ServiceStats {
            ranked_players: leaderboard.rankings.len(),
            ghost_players: leaderboard.ghost_count(),
            leaderboard_version: leaderboard.version,
            uptime_seconds: app_state.uptime().as_secs(),
            ..ServiceStats::default()
        };

        if let Ok(snapshot) = app_state.store().snapshot().await {
            stats.players = snapshot.players.len();
            stats.matches = snapshot.matches.len();
            stats.snapshot_version = snapshot.version;
        }
        stats
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
