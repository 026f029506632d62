//! Scoped, cancelable scheduler for delayed cues.
//!
//! Each scheduled cue is one tokio task that sleeps for its delay and then
//! hands the cue to the [`CuePlayer`]. The scheduler owns every task it
//! spawned. Cancelling aborts the task, and dropping the scheduler cancels
//! whatever is still pending.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use pathtrace_core::{CueId, TrackEvent};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cue::Cue;
use crate::error::{CueError, Result};
use crate::player::CuePlayer;

/// Owns the pending cues of one game screen.
pub struct CueScheduler {
    player: Arc<dyn CuePlayer>,
    tasks: BTreeMap<CueId, JoinHandle<()>>,
}

impl CueScheduler {
    /// Create a scheduler that plays cues through `player`.
    pub fn new(player: Arc<dyn CuePlayer>) -> Self {
        Self {
            player,
            tasks: BTreeMap::new(),
        }
    }

    /// Play `cue` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, cue: Cue) -> Result<CueId> {
        let runtime = Handle::try_current().map_err(|_| CueError::NoRuntime)?;
        self.reap();

        let id = CueId::new();
        let player = Arc::clone(&self.player);
        debug!("Scheduling cue {} ({}) in {:?}", id, cue.name(), delay);

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            match player.play(&cue).await {
                Ok(()) => debug!("Played cue {} ({})", id, cue.name()),
                Err(e) => warn!("Cue {} failed: {}", id, e),
            }
        });
        self.tasks.insert(id, handle);
        Ok(id)
    }

    /// Schedule the default cue for `event`, if it has one.
    pub fn schedule_event(&mut self, event: &TrackEvent, delay: Duration) -> Result<Option<CueId>> {
        match Cue::for_event(event) {
            Some(cue) => self.schedule(delay, cue).map(Some),
            None => Ok(None),
        }
    }

    /// Cancel a pending cue. Returns `false` if it already played or was unknown.
    pub fn cancel(&mut self, id: CueId) -> bool {
        match self.tasks.remove(&id) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                if pending {
                    debug!("Cancelled cue {}", id);
                }
                pending
            }
            None => false,
        }
    }

    /// Cancel every pending cue and return how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for (_, handle) in std::mem::take(&mut self.tasks) {
            if !handle.is_finished() {
                cancelled += 1;
            }
            handle.abort();
        }
        if cancelled > 0 {
            debug!("Cancelled {} pending cues", cancelled);
        }
        cancelled
    }

    /// Number of cues that have not played yet.
    pub fn pending(&mut self) -> usize {
        self.reap();
        self.tasks.len()
    }

    fn reap(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}

impl Drop for CueScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
