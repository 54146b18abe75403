//! Hoops CLI
//!
//! Runs single games and whole seasons from JSON files.

mod league;
mod report;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::info;

use hoops_core::api::{GameRequest, SCHEMA_VERSION};
use hoops_core::{
    simulate_game, simulate_game_json, BadgeCatalog, BatchSimulationScheduler, CampaignContext,
    SimConfig,
};

#[derive(Parser)]
#[command(name = "hoops_cli")]
#[command(about = "Simulate basketball games and seasons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one game from a request file
    Game {
        /// Request JSON (schema_version, seed, home_team, away_team)
        request: PathBuf,

        /// Print the JSON response instead of a box score
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Simulate a full season schedule in parallel
    Season {
        /// League JSON (season, start_date, teams, rounds)
        league: PathBuf,

        /// Batch seed; every game seed derives from it
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Concurrent games (defaults to config, then CPU count)
        #[arg(long)]
        workers: Option<usize>,

        /// SimConfig file, JSON or YAML
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Game { request, json } => run_game(&request, json),
        Commands::Season { league, seed, workers, config } => {
            run_season(&league, seed, workers, config.as_deref()).await
        }
    }
}

fn run_game(path: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;

    if json {
        let response = simulate_game_json(&text).map_err(|e| anyhow!(e))?;
        println!("{response}");
        return Ok(());
    }

    let request: GameRequest = serde_json::from_str(&text)
        .with_context(|| format!("parsing request {}", path.display()))?;
    if request.schema_version != SCHEMA_VERSION {
        bail!("unsupported schema version: {}", request.schema_version);
    }
    let config = request.config.clone().unwrap_or_default();
    let result = simulate_game(
        request.game_id,
        &request.home_team,
        &request.away_team,
        request.seed,
        &config,
        BadgeCatalog::builtin(),
    )
    .context("simulating game")?;

    print!("{}", report::box_score(&result, &request.home_team, &request.away_team));
    Ok(())
}

async fn run_season(
    path: &Path,
    seed: u64,
    workers: Option<usize>,
    config_path: Option<&Path>,
) -> Result<()> {
    let league = league::LeagueFile::load(path)?;
    let config = match config_path {
        Some(p) => SimConfig::from_path(p).with_context(|| format!("loading config {}", p.display()))?,
        None => SimConfig::default(),
    };
    config.validate().context("invalid config")?;

    let teams: Vec<Arc<_>> = league.teams.into_iter().map(Arc::new).collect();
    let games = league::schedule(&teams, league.rounds);
    let ctx = CampaignContext::new(league.season, league.start_date, seed);

    let mut scheduler = BatchSimulationScheduler::new(config, BadgeCatalog::builtin());
    if let Some(n) = workers {
        scheduler = scheduler.with_workers(n);
    }
    info!(games = games.len(), workers = scheduler.workers(), "simulating season");

    let handle = scheduler.run_batch(games, &ctx)?;
    let total = handle.total();
    let mut updates = std::pin::pin!(handle.progress_stream());
    let mut stderr = std::io::stderr();
    while let Some(p) = updates.next().await {
        let _ = write!(stderr, "\r[{}/{}] {:>5.1}%  failed {}", p.completed, total, p.fraction() * 100.0, p.failed);
        let _ = stderr.flush();
    }
    let _ = writeln!(stderr);

    let report = handle.join().await?;
    print!("{}", report::season_summary(&report, &teams));
    Ok(())
}
