//! Batch job bookkeeping: what was requested and how each game settled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::GameError;
use crate::models::{GameResult, Team};

/// One game to simulate. Teams are shared snapshots; the simulator works on
/// its own copies.
#[derive(Debug, Clone)]
pub struct GameSpec {
    pub game_id: u64,
    pub home: Arc<Team>,
    pub away: Arc<Team>,
    /// Explicit seed. `None` derives one from the batch seed and game id.
    pub seed: Option<u64>,
}

impl GameSpec {
    pub fn new(game_id: u64, home: Arc<Team>, away: Arc<Team>) -> Self {
        Self { game_id, home, away, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// Per-game status for one batch request. Archived once every game it
/// scheduled has settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub statuses: BTreeMap<u64, JobStatus>,
    pub archived: bool,
}

impl BatchJob {
    pub fn new<'a>(game_ids: impl IntoIterator<Item = &'a u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            statuses: game_ids.into_iter().map(|id| (*id, JobStatus::Pending)).collect(),
            archived: false,
        }
    }

    pub fn set(&mut self, game_id: u64, status: JobStatus) {
        if let Some(slot) = self.statuses.get_mut(&game_id) {
            *slot = status;
        }
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    pub fn total(&self) -> usize {
        self.statuses.len()
    }

    /// Marks the job archived if nothing is still running.
    pub fn archive(&mut self) {
        self.archived = self.count(JobStatus::Running) == 0;
    }
}

/// How one game of a batch ended.
#[derive(Debug, Clone)]
pub enum GameOutcome {
    Completed(Arc<GameResult>),
    Failed(GameError),
    /// Never started because the batch was cancelled.
    Cancelled,
}

impl GameOutcome {
    pub fn result(&self) -> Option<&Arc<GameResult>> {
        match self {
            GameOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GameError> {
        match self {
            GameOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_tracks_statuses() {
        let ids = [3u64, 1, 2];
        let mut job = BatchJob::new(&ids);
        assert_eq!(job.count(JobStatus::Pending), 3);

        job.set(1, JobStatus::Running);
        job.archive();
        assert!(!job.archived);

        job.set(1, JobStatus::Done);
        job.set(2, JobStatus::Failed);
        job.set(99, JobStatus::Done);
        job.archive();
        assert!(job.archived);
        assert_eq!(job.count(JobStatus::Pending), 1);
        assert_eq!(job.total(), 3);
        assert!(JobStatus::Failed.is_settled() && !JobStatus::Running.is_settled());
    }
}
