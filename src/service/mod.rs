//! Service layer for the pong-ladder service
//!
//! Roster and match writes, the leaderboard pipeline, and the application
//! state that ties them to a store and runs their background tasks.

pub mod app;
pub mod health;
pub mod leaderboard;
pub mod roster;
pub mod submission;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use leaderboard::{Leaderboard, LeaderboardService};
pub use roster::{normalize_player, RosterService};
pub use submission::{
    validate_resolution, MatchResolver, ResolvedMatch, SubmissionService, TextPatternResolver,
};
