//! Worker pool for many independent games.
//!
//! The driver is a tokio task that feeds games into a `JoinSet` of blocking
//! workers, at most `workers` at a time. Each game runs on its own seed and
//! its own copy of the rosters, so results don't depend on which worker
//! picked a game up or in what order games finished.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, Stream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::job::{BatchJob, GameOutcome, GameSpec, JobStatus};
use super::progress::{BatchProgress, CancelToken};
use crate::badges::BadgeCatalog;
use crate::engine::config::SimConfig;
use crate::engine::deterministic::derive_game_seed;
use crate::engine::game_sim::simulate_game;
use crate::error::{BatchError, GameError};
use crate::models::{CampaignContext, GameResult};

pub struct BatchSimulationScheduler {
    config: Arc<SimConfig>,
    catalog: Arc<BadgeCatalog>,
    workers: usize,
}

impl BatchSimulationScheduler {
    /// Worker count comes from `config.batch`.
    pub fn new(config: SimConfig, catalog: Arc<BadgeCatalog>) -> Self {
        let workers = config.batch.resolved_workers();
        Self { config: Arc::new(config), catalog, workers }
    }

    pub fn with_defaults() -> Self {
        Self::new(SimConfig::default(), BadgeCatalog::builtin())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Starts simulating `games` and returns immediately.
    ///
    /// Games without an explicit seed get `derive_game_seed(ctx.seed, game_id)`.
    /// A game that fails (bad roster, panic) is reported in the final
    /// [`BatchReport`] and never stops the rest of the batch.
    pub fn run_batch(
        &self,
        games: Vec<GameSpec>,
        ctx: &CampaignContext,
    ) -> Result<BatchHandle, BatchError> {
        self.run_batch_with_cancel(games, ctx, CancelToken::new())
    }

    /// Same as [`run_batch`](Self::run_batch) with a caller-owned token.
    pub fn run_batch_with_cancel(
        &self,
        games: Vec<GameSpec>,
        ctx: &CampaignContext,
        cancel: CancelToken,
    ) -> Result<BatchHandle, BatchError> {
        if games.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        let mut seen = HashSet::with_capacity(games.len());
        for spec in &games {
            if !seen.insert(spec.game_id) {
                return Err(BatchError::DuplicateGameId { game_id: spec.game_id });
            }
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BatchError::NoRuntime)?;

        let job = BatchJob::new(games.iter().map(|g| &g.game_id));
        let job_id = job.id;
        let total = games.len();
        let (progress_tx, progress_rx) = watch::channel(BatchProgress::new(total));

        info!(
            job_id = %job_id,
            games = total,
            workers = self.workers,
            season = ctx.season,
            "batch started"
        );

        let driver = Driver {
            config: Arc::clone(&self.config),
            catalog: Arc::clone(&self.catalog),
            workers: self.workers,
            batch_seed: ctx.seed,
            cancel: cancel.clone(),
            progress_tx,
        };
        let handle = runtime.spawn(driver.run(games, job));

        Ok(BatchHandle { job_id, total, progress: progress_rx, cancel, driver: handle })
    }
}

struct Driver {
    config: Arc<SimConfig>,
    catalog: Arc<BadgeCatalog>,
    workers: usize,
    batch_seed: u64,
    cancel: CancelToken,
    progress_tx: watch::Sender<BatchProgress>,
}

impl Driver {
    async fn run(self, games: Vec<GameSpec>, mut job: BatchJob) -> BatchReport {
        let started = Instant::now();
        let mut progress = BatchProgress::new(games.len());
        let mut outcomes = BTreeMap::new();
        let mut queue = games.into_iter();
        let mut set = JoinSet::new();

        loop {
            while set.len() < self.workers && !self.cancel.is_cancelled() {
                let Some(spec) = queue.next() else { break };
                job.set(spec.game_id, JobStatus::Running);
                let config = Arc::clone(&self.config);
                let catalog = Arc::clone(&self.catalog);
                let batch_seed = self.batch_seed;
                set.spawn_blocking(move || run_one(spec, batch_seed, &config, catalog));
            }

            let Some(joined) = set.join_next().await else { break };
            let (game_id, result) = match joined {
                Ok(settled) => settled,
                Err(err) => {
                    // Picked up below as a game that never reported
                    error!(error = %err, "batch worker lost");
                    continue;
                }
            };

            progress.completed += 1;
            progress.current_game_id = Some(game_id);
            match result {
                Ok(result) => {
                    job.set(game_id, JobStatus::Done);
                    outcomes.insert(game_id, GameOutcome::Completed(Arc::new(result)));
                }
                Err(err) => {
                    warn!(game_id, error = %err, "game failed");
                    progress.failed += 1;
                    job.set(game_id, JobStatus::Failed);
                    outcomes.insert(game_id, GameOutcome::Failed(err));
                }
            }
            self.progress_tx.send_replace(progress);
        }

        for spec in queue {
            progress.cancelled += 1;
            outcomes.insert(spec.game_id, GameOutcome::Cancelled);
        }

        let lost: Vec<u64> = job
            .statuses
            .iter()
            .filter(|(_, status)| **status == JobStatus::Running)
            .map(|(id, _)| *id)
            .collect();
        for game_id in lost {
            progress.completed += 1;
            progress.failed += 1;
            job.set(game_id, JobStatus::Failed);
            outcomes.insert(
                game_id,
                GameOutcome::Failed(GameError::Panicked { message: "worker task lost".to_string() }),
            );
        }

        job.archive();
        self.progress_tx.send_replace(progress);

        let elapsed = started.elapsed();
        info!(
            job_id = %job.id,
            completed = progress.completed,
            failed = progress.failed,
            cancelled = progress.cancelled,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch finished"
        );
        BatchReport { job, outcomes, progress, elapsed }
    }
}

/// Panics are already converted to `GameError::Panicked` by `simulate_game`.
fn run_one(
    spec: GameSpec,
    batch_seed: u64,
    config: &SimConfig,
    catalog: Arc<BadgeCatalog>,
) -> (u64, Result<GameResult, GameError>) {
    let game_id = spec.game_id;
    let seed = spec.seed.unwrap_or_else(|| derive_game_seed(batch_seed, game_id));
    (game_id, simulate_game(game_id, &spec.home, &spec.away, seed, config, catalog))
}

/// Live view of a running batch.
pub struct BatchHandle {
    job_id: Uuid,
    total: usize,
    progress: watch::Receiver<BatchProgress>,
    cancel: CancelToken,
    driver: JoinHandle<BatchReport>,
}

impl BatchHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Latest snapshot. Never blocks.
    pub fn progress(&self) -> BatchProgress {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchProgress> {
        self.progress.clone()
    }

    /// Every snapshot published after this call. Ends when the batch does.
    pub fn progress_stream(&self) -> impl Stream<Item = BatchProgress> + Send + 'static {
        stream::unfold(self.progress.clone(), |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = *rx.borrow_and_update();
            Some((snapshot, rx))
        })
    }

    /// Stops scheduling new games. Games already running finish normally.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.driver.is_finished()
    }

    /// Waits for the batch to settle.
    pub async fn join(self) -> Result<BatchReport, BatchError> {
        Ok(self.driver.await?)
    }
}

/// Everything a finished batch produced, keyed by game id.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub job: BatchJob,
    pub outcomes: BTreeMap<u64, GameOutcome>,
    pub progress: BatchProgress,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn result(&self, game_id: u64) -> Option<&Arc<GameResult>> {
        self.outcomes.get(&game_id).and_then(GameOutcome::result)
    }

    /// Completed games in game-id order.
    pub fn results(&self) -> impl Iterator<Item = &Arc<GameResult>> {
        self.outcomes.values().filter_map(GameOutcome::result)
    }

    pub fn failures(&self) -> impl Iterator<Item = (u64, &GameError)> {
        self.outcomes.iter().filter_map(|(id, o)| o.error().map(|e| (*id, e)))
    }

    pub fn completed_count(&self) -> usize {
        self.results().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.outcomes.values().filter(|o| matches!(o, GameOutcome::Cancelled)).count()
    }
}

// ========== Tests ==========
