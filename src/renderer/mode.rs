use super::error::Result;
use super::internal::pool::WorkerPool;
use super::surface::LiveResources;
use serde::{Deserialize, Serialize};

/// How batches are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// One slice per batch, recorded straight into the queue's surface.
    #[default]
    Immediate,
    /// Batches are split across the worker pool and replayed in slice order.
    Parallel,
}

/// Owns the worker pool and applies mode requests between frames.
pub(crate) struct ModeController {
    applied: RenderMode,
    requested: RenderMode,
    pool: Option<WorkerPool>,
    max_workers: usize,
    thread_name_prefix: String,
    live: LiveResources,
}

impl ModeController {
    pub(crate) fn new(
        requested: RenderMode,
        max_workers: usize,
        thread_name_prefix: &str,
        live: LiveResources,
    ) -> Self {
        Self {
            applied: RenderMode::Immediate,
            requested,
            pool: None,
            max_workers,
            thread_name_prefix: thread_name_prefix.to_owned(),
            live,
        }
    }

    pub(crate) fn applied(&self) -> RenderMode {
        self.applied
    }

    pub(crate) fn requested(&self) -> RenderMode {
        self.requested
    }

    /// Records a mode change. Nothing happens until [`Self::update`].
    pub(crate) fn request(&mut self, mode: RenderMode) {
        self.requested = mode;
    }

    /// Applies a pending request. Returns whether the mode changed.
    ///
    /// Entering Parallel builds the pool; leaving it drops the pool, which
    /// asserts that no recorder task is still running.
    pub(crate) fn update(&mut self) -> Result<bool> {
        if self.requested == self.applied {
            return Ok(false);
        }

        match self.requested {
            RenderMode::Parallel => {
                match WorkerPool::new(self.max_workers, &self.thread_name_prefix, &self.live) {
                    Ok(pool) => self.pool = Some(pool),
                    Err(err) => {
                        log::error!("Staying in {:?} mode: {}", self.applied, err);
                        self.requested = self.applied;
                        return Err(err);
                    }
                }
            }
            RenderMode::Immediate => {
                self.pool = None;
            }
        }

        log::info!("Render mode {:?} -> {:?}", self.applied, self.requested);
        self.applied = self.requested;
        Ok(true)
    }

    pub(crate) fn pool_mut(&mut self) -> Option<&mut WorkerPool> {
        self.pool.as_mut()
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::worker_count)
    }
}
