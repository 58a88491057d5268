//! Ladder Replay CLI Tool
//!
//! Replays a seed document offline and prints the resulting leaderboard.
//!
//! Usage:
//!   cargo run --bin ladder-replay -- ladder.json
//!   cargo run --bin ladder-replay -- ladder.json --json
//!   cargo run --bin ladder-replay -- ladder.json --k-factor 16 --baseline 1000

use anyhow::Result;
use clap::Parser;
use pong_ladder::config::RatingSettings;
use pong_ladder::dashboard::{compute_dashboard, DashboardSummary};
use pong_ladder::rating::{EloRatingCalculator, ExtendedEloConfig, RatingEngine};
use pong_ladder::store::SeedDocument;
use pong_ladder::types::PlayerStats;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "ladder-replay")]
#[command(about = "Replay a ladder seed file and print the rankings")]
struct Cli {
    /// JSON document with "players" and "matches"
    seed: PathBuf,

    /// Print rankings and dashboard as JSON
    #[arg(long)]
    json: bool,

    /// Starting rating for every player
    #[arg(long, default_value_t = RatingSettings::default().baseline)]
    baseline: i64,

    /// Elo K-factor
    #[arg(long, default_value_t = RatingSettings::default().k_factor)]
    k_factor: f64,

    /// Log level for diagnostics on stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn print_table(rankings: &[PlayerStats]) {
    println!(
        "{:>4}  {:<28} {:<13} {:>6} {:>4} {:>4} {:>6}",
        "#", "Player", "Category", "Rating", "W", "L", "Played"
    );
    println!("{}", "─".repeat(72));
    for (i, stats) in rankings.iter().enumerate() {
        println!(
            "{:>4}  {:<28} {:<13} {:>6} {:>4} {:>4} {:>6}",
            i + 1,
            stats.name,
            stats.category,
            stats.rating,
            stats.wins,
            stats.losses,
            stats.matches_played
        );
    }
}

fn print_dashboard(dashboard: &DashboardSummary) {
    println!();
    println!("Matches played:        {}", dashboard.total_matches);
    println!("Sets played:           {}", dashboard.total_sets);
    println!(
        "Average sets / match:  {:.2}",
        dashboard.average_sets_per_match
    );
    if let Some(score) = &dashboard.most_common_score {
        println!("Most common score:     {} ({}x)", score.score, score.count);
    }
    if let Some(pairing) = &dashboard.most_common_pairing {
        println!(
            "Most common pairing:   {} vs {} ({}x)",
            pairing.players.0, pairing.players.1, pairing.count
        );
    }
    if let Some(top) = &dashboard.top_player {
        println!("Top player:            {} ({})", top.name, top.rating);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level.as_str())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let seed = SeedDocument::from_file(&cli.seed)?;
    info!(
        "Replaying {} matches for {} registered players",
        seed.matches.len(),
        seed.players.len()
    );

    let calculator = EloRatingCalculator::new(ExtendedEloConfig::new(cli.baseline, cli.k_factor))?;
    let engine = RatingEngine::new(Arc::new(calculator));

    let rankings = engine.compute_rankings(&seed.players, &seed.matches);
    let dashboard = compute_dashboard(&seed.matches, &rankings);

    if cli.json {
        let output = json!({
            "rankings": rankings,
            "dashboard": dashboard,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(&rankings);
        print_dashboard(&dashboard);
    }

    Ok(())
}
