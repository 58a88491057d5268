//! Metrics for the pong-ladder service
//!
//! Prometheus metrics for recomputes and writes. They are exposed on the
//! `/metrics` route of the HTTP server.

pub mod collector;

pub use collector::{LeaderboardMetrics, MetricsCollector, MetricsTimer, WriteMetrics};
