//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use pong_ladder::error::Result;
use pong_ladder::service::{MatchResolver, ResolvedMatch};
use pong_ladder::types::{Category, Match, NewPlayer, Player};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

mock! {
    pub Resolver {}

    #[async_trait]
    impl MatchResolver for Resolver {
        async fn resolve(&self, text: &str, roster: &[Player]) -> Result<ResolvedMatch>;
    }
}

/// Resolver that takes a while to answer, for exercising in-flight limits
/// and timeouts
pub struct SlowResolver {
    delay: Duration,
    answer: ResolvedMatch,
    calls: AtomicUsize,
}

impl SlowResolver {
    pub fn new(delay: Duration, answer: ResolvedMatch) -> Self {
        Self {
            delay,
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchResolver for SlowResolver {
    async fn resolve(&self, _text: &str, _roster: &[Player]) -> Result<ResolvedMatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.answer.clone())
    }
}

pub fn new_player(name: &str, nickname: &str, category: Category) -> NewPlayer {
    NewPlayer {
        full_name: name.to_string(),
        nicknames: vec![nickname.to_string()],
        category,
    }
}

pub fn roster_entry(name: &str) -> Player {
    Player {
        id: format!("id-{}", name.to_lowercase().replace(' ', "-")),
        full_name: name.to_string(),
        nicknames: vec![name.to_lowercase()],
        category: Category::Intermediate,
    }
}

pub fn match_record(id: &str, p1: &str, s1: u32, p2: &str, s2: u32, timestamp: i64) -> Match {
    Match {
        id: id.to_string(),
        player1: p1.to_string(),
        player2: p2.to_string(),
        score1: s1,
        score2: s2,
        timestamp,
    }
}

pub fn resolved(p1: &str, s1: i64, p2: &str, s2: i64) -> ResolvedMatch {
    ResolvedMatch {
        valid: true,
        player1: p1.to_string(),
        score1: s1,
        player2: p2.to_string(),
        score2: s2,
        match_date: None,
    }
}
