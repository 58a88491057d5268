//! HTTP surface of the ladder service
//!
//! JSON endpoints over the roster, the match history and the published
//! leaderboard, plus health and Prometheus metrics.

pub mod handlers;
pub mod server;

pub use handlers::{status_for, ApiError, MatchText};
pub use server::{create_router, HttpServer, HttpServerConfig};
