//! Error types for the ladder service
//!
//! Domain failures are modelled with thiserror and carried through the
//! application as anyhow errors, so callers can downcast when they need to
//! distinguish them (the HTTP layer maps them to status codes).

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Failures surfaced by the roster, submission and configuration layers.
///
/// The rating engine itself never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("A player named '{name}' is already registered")]
    DuplicatePlayer { name: String },

    #[error("Invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("A player cannot play against themselves: {name}")]
    SelfPlay { name: String },

    #[error("Players not found in roster: {names:?}")]
    UnresolvedPlayers { names: Vec<String> },

    #[error("Could not understand match text: {reason}")]
    InvalidResolution { reason: String },

    #[error("Malformed request body: {reason}")]
    InvalidRequest { reason: String },

    #[error("Another submission is still in progress")]
    SubmissionInProgress,

    #[error("Match resolver failed: {message}")]
    ResolverFailed { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl LadderError {
    /// Short machine-readable code used in API responses and metric labels
    pub fn code(&self) -> &'static str {
        match self {
            LadderError::DuplicatePlayer { .. } => "duplicate_player",
            LadderError::InvalidPlayer { .. } => "invalid_player",
            LadderError::PlayerNotFound { .. } => "player_not_found",
            LadderError::MatchNotFound { .. } => "match_not_found",
            LadderError::SelfPlay { .. } => "self_play",
            LadderError::UnresolvedPlayers { .. } => "unresolved_players",
            LadderError::InvalidResolution { .. } => "invalid_resolution",
            LadderError::InvalidRequest { .. } => "invalid_request",
            LadderError::SubmissionInProgress => "submission_in_progress",
            LadderError::ResolverFailed { .. } => "resolver_failed",
            LadderError::ConfigurationError { .. } => "configuration_error",
            LadderError::InternalError { .. } => "internal_error",
        }
    }
}
