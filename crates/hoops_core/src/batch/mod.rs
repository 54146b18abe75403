//! # Batch Simulation
//!
//! Runs a slate of independent games (a league night, a full season) on a
//! bounded worker pool.
//!
//! ```text
//! run_batch(games, ctx)
//!     └─ driver task ── JoinSet<spawn_blocking(simulate_game)> (≤ workers)
//!            ├─ watch::Sender<BatchProgress>   → BatchHandle::progress()
//!            └─ BatchReport                    → BatchHandle::join()
//! ```
//!
//! Per-game failures land in the report; only a malformed request
//! (empty, duplicate ids, no runtime) fails the whole call.

mod job;
mod progress;
mod scheduler;

pub use job::{BatchJob, GameOutcome, GameSpec, JobStatus};
pub use progress::{BatchProgress, CancelToken};
pub use scheduler::{BatchHandle, BatchReport, BatchSimulationScheduler};
