//! Path Tracing Engine
//!
//! Proximity queries, progress ratchet, corridor guard and the round state
//! machine that validates a child's finger trace against a reference path.

#![warn(missing_docs)]

pub mod proximity;
pub mod progress;
pub mod guard;
pub mod limiter;
pub mod input;
pub mod difficulty;
pub mod round;

pub use proximity::{nearest, PreparedPath, Proximity};
pub use progress::{Motion, ProgressTracker};
pub use guard::{classify, GuardOutcome, TrackGuard, Transition};
pub use limiter::SpeedLimiter;
pub use input::InputSanitizer;
pub use difficulty::DifficultyRamp;
pub use round::{RoundError, RoundStateMachine, TrackUpdate};
