//! Progress reporting and cooperative cancellation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Latest-state-wins snapshot published after every settled game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Games that finished, successfully or not.
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
    /// Games dropped by cancellation before they started.
    pub cancelled: usize,
    /// Game that settled most recently.
    pub current_game_id: Option<u64>,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self { total, ..Default::default() }
    }

    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.completed + self.cancelled >= self.total
    }

    /// 0.0 to 1.0 over games that will actually run.
    pub fn fraction(&self) -> f32 {
        let planned = self.total.saturating_sub(self.cancelled);
        if planned == 0 {
            return 1.0;
        }
        self.completed as f32 / planned as f32
    }
}

/// Shared flag checked by the scheduler between games. Running games are
/// never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
