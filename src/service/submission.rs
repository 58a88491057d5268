//! Match submission
//!
//! Free text goes through a [`MatchResolver`] that turns it into a structured
//! record naming two roster players. The record is validated here before a
//! match is ever written, so the store only holds matches between two
//! distinct, registered names.

use crate::error::{LadderError, Result};
use crate::metrics::MetricsCollector;
use crate::store::LadderStore;
use crate::types::{Match, MatchId, NewMatch, Player, TimestampMs};
use crate::utils::{current_timestamp_ms, names_match, parse_match_date};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Structured record returned by a resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMatch {
    /// False when the text did not describe a match
    pub valid: bool,
    #[serde(default)]
    pub player1: String,
    #[serde(default)]
    pub score1: i64,
    #[serde(default)]
    pub player2: String,
    #[serde(default)]
    pub score2: i64,
    /// ISO-8601 date or date-time when the match was played
    #[serde(default)]
    pub match_date: Option<String>,
}

impl ResolvedMatch {
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Turns free text into a structured match record.
///
/// Implementations should return full names taken from `roster`.
#[async_trait]
pub trait MatchResolver: Send + Sync {
    async fn resolve(&self, text: &str, roster: &[Player]) -> Result<ResolvedMatch>;
}

/// Find the roster player a name or nickname refers to
fn lookup<'a>(roster: &'a [Player], name: &str) -> Option<&'a Player> {
    if let Some(player) = roster.iter().find(|p| p.full_name == name) {
        return Some(player);
    }
    let mut candidates = roster.iter().filter(|p| {
        names_match(&p.full_name, name) || p.nicknames.iter().any(|n| names_match(n, name))
    });
    let first = candidates.next()?;
    // an ambiguous nickname resolves to nobody
    match candidates.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Resolver for short structured phrases such as `Alice 3 x 1 Bob`.
///
/// The scores may be separated by `x`, `-` or `:` (with or without spaces)
/// and the phrase may end with `on YYYY-MM-DD`. Names are matched against
/// full names and nicknames, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct TextPatternResolver;

impl TextPatternResolver {
    pub fn new() -> Self {
        Self
    }

    fn parse_score_token(token: &str) -> Option<(i64, i64)> {
        let (a, b) = token.split_once(['x', 'X', '-', ':'])?;
        Some((a.parse().ok()?, b.parse().ok()?))
    }

    fn is_separator(token: &str) -> bool {
        matches!(token.to_lowercase().as_str(), "x" | "-" | ":" | "vs")
    }

    /// Split text into (name1, score1, score2, name2, date)
    pub fn parse(text: &str) -> Option<(String, i64, i64, String, Option<String>)> {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();

        let mut match_date = None;
        if tokens.len() >= 2 && tokens[tokens.len() - 2].eq_ignore_ascii_case("on") {
            match_date = tokens.pop().map(str::to_string);
            tokens.pop();
        }

        for i in 1..tokens.len() {
            if let Some((s1, s2)) = Self::parse_score_token(tokens[i]) {
                if i + 1 < tokens.len() {
                    return Some((
                        tokens[..i].join(" "),
                        s1,
                        s2,
                        tokens[i + 1..].join(" "),
                        match_date,
                    ));
                }
            }
            if i + 3 < tokens.len() && Self::is_separator(tokens[i + 1]) {
                if let (Ok(s1), Ok(s2)) = (tokens[i].parse(), tokens[i + 2].parse()) {
                    return Some((
                        tokens[..i].join(" "),
                        s1,
                        s2,
                        tokens[i + 3..].join(" "),
                        match_date,
                    ));
                }
            }
        }
        None
    }
}

#[async_trait]
impl MatchResolver for TextPatternResolver {
    async fn resolve(&self, text: &str, roster: &[Player]) -> Result<ResolvedMatch> {
        let Some((name1, score1, score2, name2, match_date)) = Self::parse(text) else {
            debug!("Text did not match the score pattern: {:?}", text);
            return Ok(ResolvedMatch::invalid());
        };

        let canonical = |name: String| match lookup(roster, &name) {
            Some(player) => player.full_name.clone(),
            None => name,
        };

        Ok(ResolvedMatch {
            valid: true,
            player1: canonical(name1),
            score1,
            player2: canonical(name2),
            score2,
            match_date,
        })
    }
}

/// Check a resolver record against the roster and turn it into a match.
///
/// `now` is used when the record carries no usable date.
pub fn validate_resolution(
    resolved: &ResolvedMatch,
    roster: &[Player],
    now: TimestampMs,
) -> Result<NewMatch> {
    if !resolved.valid {
        return Err(LadderError::InvalidResolution {
            reason: "the text does not describe a match result".to_string(),
        }
        .into());
    }

    let first = lookup(roster, resolved.player1.trim());
    let second = lookup(roster, resolved.player2.trim());
    let (first, second) = match (first, second) {
        (Some(first), Some(second)) => (first, second),
        _ => {
            let mut names = Vec::new();
            if first.is_none() {
                names.push(resolved.player1.clone());
            }
            if second.is_none() {
                names.push(resolved.player2.clone());
            }
            return Err(LadderError::UnresolvedPlayers { names }.into());
        }
    };

    if first.id == second.id {
        return Err(LadderError::SelfPlay {
            name: first.full_name.clone(),
        }
        .into());
    }

    let score = |value: i64| {
        u32::try_from(value).map_err(|_| LadderError::InvalidResolution {
            reason: format!("score out of range: {}", value),
        })
    };
    let score1 = score(resolved.score1)?;
    let score2 = score(resolved.score2)?;

    let timestamp = match resolved.match_date.as_deref().map(str::trim) {
        None | Some("") => now,
        Some(raw) => parse_match_date(raw).unwrap_or_else(|| {
            warn!("Ignoring unparseable match date {:?}", raw);
            now
        }),
    };

    Ok(NewMatch {
        player1: first.full_name.clone(),
        player2: second.full_name.clone(),
        score1,
        score2,
        timestamp,
    })
}

/// Records matches from free text or pre-resolved records.
///
/// Only one submission runs at a time; a second caller gets
/// [`LadderError::SubmissionInProgress`] instead of waiting.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn LadderStore>,
    resolver: Arc<dyn MatchResolver>,
    in_flight: Arc<Mutex<()>>,
    resolve_timeout: Duration,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn LadderStore>,
        resolver: Arc<dyn MatchResolver>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            store,
            resolver,
            in_flight: Arc::new(Mutex::new(())),
            resolve_timeout,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record_outcome(&self, result: &Result<Match>) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let outcome = match result {
            Ok(_) => "recorded",
            Err(e) => e
                .downcast_ref::<LadderError>()
                .map(LadderError::code)
                .unwrap_or("error"),
        };
        metrics.record_submission(outcome);
    }

    fn begin(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
        self.in_flight
            .try_lock()
            .map_err(|_| LadderError::SubmissionInProgress.into())
    }

    /// Resolve and validate text without writing anything
    async fn prepare(&self, text: &str) -> Result<NewMatch> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LadderError::InvalidResolution {
                reason: "empty text".to_string(),
            }
            .into());
        }

        let roster = self.store.players().await?;
        let timer = self.metrics.as_ref().map(|m| m.start_timer());
        let resolved = tokio::time::timeout(
            self.resolve_timeout,
            self.resolver.resolve(text, roster.as_slice()),
        )
        .await
        .map_err(|_| LadderError::ResolverFailed {
            message: format!("timed out after {:?}", self.resolve_timeout),
        })?
        .map_err(|e| LadderError::ResolverFailed {
            message: e.to_string(),
        })?;
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_resolve(timer.stop());
        }
        debug!("Resolved {:?} to {:?}", text, resolved);

        validate_resolution(&resolved, roster.as_slice(), current_timestamp_ms())
    }

    async fn record(&self, new_match: NewMatch) -> Result<Match> {
        let recorded = self.store.insert_match(new_match).await?;
        info!(
            "Recorded match {}: {} {} x {} {}",
            recorded.id, recorded.player1, recorded.score1, recorded.score2, recorded.player2
        );
        Ok(recorded)
    }

    /// Resolve free text and record the match it describes
    pub async fn submit_text(&self, text: &str) -> Result<Match> {
        let result = match self.begin() {
            Ok(_guard) => match self.prepare(text).await {
                Ok(new_match) => self.record(new_match).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("Match submission rejected: {}", e);
        }
        self.record_outcome(&result);
        result
    }

    /// Record an already structured result, skipping the resolver
    pub async fn submit_resolved(&self, resolved: ResolvedMatch) -> Result<Match> {
        let result = match self.begin() {
            Ok(_guard) => self.record_resolved(&resolved).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("Structured match submission rejected: {}", e);
        }
        self.record_outcome(&result);
        result
    }

    async fn record_resolved(&self, resolved: &ResolvedMatch) -> Result<Match> {
        let roster = self.store.players().await?;
        let new_match = validate_resolution(resolved, roster.as_slice(), current_timestamp_ms())?;
        self.record(new_match).await
    }

    /// Delete a recorded match
    pub async fn delete_match(&self, match_id: &MatchId) -> Result<()> {
        if !self.store.remove_match(match_id).await? {
            return Err(LadderError::MatchNotFound {
                match_id: match_id.clone(),
            }
            .into());
        }
        info!("Deleted match {}", match_id);
        Ok(())
    }

    /// Replace a match with a new one described by `text`.
    ///
    /// The new text is resolved first; only when it is valid is the old match
    /// deleted and the new one recorded under a fresh identifier.
    pub async fn edit_match(&self, match_id: &MatchId, text: &str) -> Result<Match> {
        let result = match self.begin() {
            Ok(_guard) => self.replace(match_id, text).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("Match edit rejected for {}: {}", match_id, e);
        }
        self.record_outcome(&result);
        result
    }

    async fn replace(&self, match_id: &MatchId, text: &str) -> Result<Match> {
        let exists = self
            .store
            .matches()
            .await?
            .iter()
            .any(|m| &m.id == match_id);
        if !exists {
            return Err(LadderError::MatchNotFound {
                match_id: match_id.clone(),
            }
            .into());
        }

        let new_match = self.prepare(text).await?;
        self.delete_match(match_id).await?;
        let recorded = self.record(new_match).await?;
        info!("Match {} replaced by {}", match_id, recorded.id);
        Ok(recorded)
    }
}
