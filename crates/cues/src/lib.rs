//! Feedback Cues
//!
//! Delayed audio, speech and haptic feedback for tracing rounds. The engine
//! stays synchronous; the caller owns a [`CueScheduler`] on its tokio runtime
//! and cancels it when the round ends.

#![warn(missing_docs)]

pub mod cue;
pub mod player;
pub mod scheduler;
mod error;

pub use cue::Cue;
pub use player::CuePlayer;
pub use scheduler::CueScheduler;
pub use error::{CueError, Result};
