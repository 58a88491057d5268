//! Integration tests for the pong-ladder service
//!
//! These tests validate the system working together:
//! - Roster writes and match submission through a resolver
//! - The leaderboard pipeline following store snapshots
//! - Single in-flight submission and resolver failures
//! - Seeding from a JSON document

mod fixtures;

use futures::future::join_all;
use pong_ladder::config::AppConfig;
use pong_ladder::error::LadderError;
use pong_ladder::service::{AppState, Leaderboard, ResolvedMatch};
use pong_ladder::store::{InMemoryLadderStore, LadderStore, SeedDocument};
use pong_ladder::types::Category;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use fixtures::{match_record, new_player, resolved, roster_entry, MockResolver, SlowResolver};

/// Integration test setup that creates a running system around a resolver
async fn create_test_system(
    resolver: Arc<dyn pong_ladder::service::MatchResolver>,
    config: AppConfig,
) -> (Arc<AppState>, Arc<InMemoryLadderStore>) {
    let store = Arc::new(InMemoryLadderStore::new());
    let app = AppState::with_components(config, store.clone(), resolver)
        .await
        .unwrap();
    app.start().await.unwrap();
    (Arc::new(app), store)
}

async fn register_pair(app: &AppState) {
    app.roster()
        .register_player(new_player("Alice Smith", "Ali", Category::Elite))
        .await
        .unwrap();
    app.roster()
        .register_player(new_player("Bob Jones", "Bobby", Category::Junior))
        .await
        .unwrap();
}

/// Wait until the published leaderboard reaches the store's version
async fn settled_leaderboard(app: &AppState) -> Arc<Leaderboard> {
    let target = app.store().snapshot().await.unwrap().version;
    let mut boards = app.leaderboard().subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let board = boards.borrow_and_update().clone();
            if board.version >= target {
                return board;
            }
            boards.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

fn ladder_error(err: &anyhow::Error) -> &LadderError {
    err.downcast_ref::<LadderError>().unwrap()
}

#[tokio::test]
async fn test_complete_submission_workflow() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .withf(|text, roster| text == "Ali beat Bobby 3-1" && roster.len() == 2)
        .times(1)
        .returning(|_, _| Ok(resolved("Alice Smith", 3, "Bob Jones", 1)));

    let (app, _) = create_test_system(Arc::new(resolver), AppConfig::default()).await;
    register_pair(&app).await;

    let recorded = app
        .submissions()
        .submit_text("Ali beat Bobby 3-1")
        .await
        .unwrap();
    assert_eq!(recorded.player1, "Alice Smith");
    assert_eq!((recorded.score1, recorded.score2), (3, 1));

    let board = settled_leaderboard(&app).await;
    assert_eq!(board.rankings.len(), 2);
    assert_eq!(board.rankings[0].name, "Alice Smith");
    assert_eq!(board.rankings[0].rating, 1216);
    assert_eq!(board.rankings[0].wins, 1);
    assert_eq!(board.rankings[1].name, "Bob Jones");
    assert_eq!(board.rankings[1].rating, 1184);
    assert_eq!(board.rankings[1].losses, 1);
    assert_eq!(board.dashboard.total_matches, 1);
    assert_eq!(board.dashboard.total_sets, 4);

    let metrics = app.metrics();
    let submissions = &metrics.writes().submissions_total;
    assert_eq!(submissions.with_label_values(&["recorded"]).get(), 1);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_resolution_writes_nothing() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_, _| Ok(ResolvedMatch::invalid()));

    let (app, store) = create_test_system(Arc::new(resolver), AppConfig::default()).await;
    register_pair(&app).await;
    let version = store.snapshot().await.unwrap().version;

    let err = app
        .submissions()
        .submit_text("what a lovely day")
        .await
        .unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        LadderError::InvalidResolution { .. }
    ));
    assert_eq!(store.snapshot().await.unwrap().version, version);
    assert!(store.matches().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolver_error_is_reported() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_, _| Err(anyhow::anyhow!("upstream unavailable")));

    let (app, _) = create_test_system(Arc::new(resolver), AppConfig::default()).await;
    register_pair(&app).await;

    let err = app
        .submissions()
        .submit_text("Ali 3 x 0 Bobby")
        .await
        .unwrap_err();
    match ladder_error(&err) {
        LadderError::ResolverFailed { message } => assert!(message.contains("upstream")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_resolver_timeout() {
    let resolver = Arc::new(SlowResolver::new(
        Duration::from_secs(3),
        resolved("Alice Smith", 3, "Bob Jones", 0),
    ));
    let mut config = AppConfig::default();
    config.submission.resolve_timeout_seconds = 1;

    let (app, store) = create_test_system(resolver, config).await;
    register_pair(&app).await;

    let err = app
        .submissions()
        .submit_text("Ali 3 x 0 Bobby")
        .await
        .unwrap_err();
    assert_eq!(ladder_error(&err).code(), "resolver_failed");
    assert!(store.matches().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_single_submission_in_flight() {
    let resolver = Arc::new(SlowResolver::new(
        Duration::from_millis(200),
        resolved("Alice Smith", 3, "Bob Jones", 2),
    ));
    let (app, store) = create_test_system(resolver.clone(), AppConfig::default()).await;
    register_pair(&app).await;

    let submissions = app.submissions().clone();
    let attempts = (0..4).map(|i| {
        let submissions = submissions.clone();
        async move { submissions.submit_text(&format!("attempt {}", i)).await }
    });
    let results = join_all(attempts).await;

    let recorded = results.iter().filter(|r| r.is_ok()).count();
    let busy = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .filter(|e| matches!(ladder_error(e), LadderError::SubmissionInProgress))
        .count();
    assert_eq!(recorded, 1);
    assert_eq!(busy, 3);
    assert_eq!(resolver.calls(), 1);
    assert_eq!(store.matches().await.unwrap().len(), 1);

    // the slot frees up once the first submission finishes
    app.submissions()
        .submit_text("again")
        .await
        .unwrap();
    assert_eq!(store.matches().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_edit_replaces_match_with_new_id() {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .withf(|text, _| text == "first")
        .returning(|_, _| Ok(resolved("Alice Smith", 3, "Bob Jones", 1)));
    resolver
        .expect_resolve()
        .withf(|text, _| text == "corrected")
        .returning(|_, _| Ok(resolved("Bob Jones", 3, "Alice Smith", 1)));
    resolver
        .expect_resolve()
        .withf(|text, _| text == "garbage")
        .returning(|_, _| Ok(ResolvedMatch::invalid()));

    let (app, store) = create_test_system(Arc::new(resolver), AppConfig::default()).await;
    register_pair(&app).await;

    let original = app.submissions().submit_text("first").await.unwrap();

    // a rejected edit leaves the original in place
    assert!(app
        .submissions()
        .edit_match(&original.id, "garbage")
        .await
        .is_err());
    assert_eq!(store.matches().await.unwrap()[0].id, original.id);

    let replacement = app
        .submissions()
        .edit_match(&original.id, "corrected")
        .await
        .unwrap();
    assert_ne!(replacement.id, original.id);

    let matches = store.matches().await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, replacement.id);

    let board = settled_leaderboard(&app).await;
    assert_eq!(board.rankings[0].name, "Bob Jones");

    let err = app
        .submissions()
        .edit_match(&original.id, "corrected")
        .await
        .unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        LadderError::MatchNotFound { .. }
    ));
}

#[tokio::test]
async fn test_submit_resolved_and_delete() {
    let (app, store) =
        create_test_system(Arc::new(MockResolver::new()), AppConfig::default()).await;
    register_pair(&app).await;

    let err = app
        .submissions()
        .submit_resolved(resolved("Alice Smith", 3, "Carol", 1))
        .await
        .unwrap_err();
    match ladder_error(&err) {
        LadderError::UnresolvedPlayers { names } => assert_eq!(names, &vec!["Carol".to_string()]),
        other => panic!("unexpected error: {other}"),
    }

    let recorded = app
        .submissions()
        .submit_resolved(resolved("Bob Jones", 2, "Alice Smith", 2))
        .await
        .unwrap();
    let board = settled_leaderboard(&app).await;
    assert!(board
        .rankings
        .iter()
        .all(|s| s.rating == 1200 && s.matches_played == 1 && s.wins == 0 && s.losses == 0));

    app.submissions().delete_match(&recorded.id).await.unwrap();
    assert!(store.matches().await.unwrap().is_empty());
    assert!(app.submissions().delete_match(&recorded.id).await.is_err());
}

#[tokio::test]
async fn test_removed_player_becomes_ghost() {
    let (app, _) =
        create_test_system(Arc::new(MockResolver::new()), AppConfig::default()).await;
    register_pair(&app).await;
    app.submissions()
        .submit_resolved(resolved("Alice Smith", 3, "Bob Jones", 0))
        .await
        .unwrap();

    let bob = app
        .roster()
        .list_players()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.full_name == "Bob Jones")
        .unwrap();
    app.roster().delete_player(&bob.id).await.unwrap();

    let board = settled_leaderboard(&app).await;
    let ghost = board
        .rankings
        .iter()
        .find(|s| s.name == "Bob Jones")
        .unwrap();
    assert!(ghost.is_ghost());
    assert_eq!(ghost.category, "?");
    assert_eq!(ghost.nicknames, vec!["Unknown".to_string()]);
    assert_eq!(ghost.rating, 1184);
    assert_eq!(board.ghost_count(), 1);
}

#[tokio::test]
async fn test_concurrent_recomputes_agree() {
    let (app, store) =
        create_test_system(Arc::new(MockResolver::new()), AppConfig::default()).await;
    register_pair(&app).await;
    for (i, (winner, loser)) in [("Alice Smith", "Bob Jones"), ("Bob Jones", "Alice Smith")]
        .iter()
        .cycle()
        .take(10)
        .enumerate()
    {
        app.submissions()
            .submit_resolved(ResolvedMatch {
                match_date: Some(format!("2024-01-{:02}", i + 1)),
                ..resolved(winner, 3, loser, i as i64 % 3)
            })
            .await
            .unwrap();
    }

    let snapshot = store.snapshot().await.unwrap();
    let tasks = (0..8).map(|_| {
        let leaderboard = app.leaderboard();
        let snapshot = snapshot.clone();
        tokio::spawn(async move { leaderboard.recompute(&snapshot).rankings })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].len(), 2);
    assert!(results[0].iter().all(|s| s.matches_played == 10));
}

#[tokio::test]
async fn test_seeded_service() {
    let seed = SeedDocument {
        players: vec![roster_entry("Alice"), roster_entry("Bob")],
        matches: vec![
            match_record("m2", "Alice", 3, "Bob", 1, 2_000),
            match_record("m1", "Alice", 3, "Bob", 1, 1_000),
            match_record("m3", "Ghost", 3, "Alice", 0, 3_000),
        ],
    };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string(&seed).unwrap()).unwrap();

    let mut config = AppConfig::default();
    config.storage.seed_file = Some(file.path().to_path_buf());
    let app = AppState::new(config).await.unwrap();

    let board = app.leaderboard().latest();
    let names: Vec<&str> = board.rankings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Ghost", "Alice", "Bob"]);
    assert_eq!(board.rankings[0].rating, 1217);
    assert_eq!(board.rankings[1].rating, 1214);
    assert_eq!(board.rankings[2].rating, 1169);
    assert!(board.rankings[0].is_ghost());
    assert_eq!(board.dashboard.most_common_score.as_ref().unwrap().score, "3-1");
}
