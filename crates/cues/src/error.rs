//! Cue errors.

/// Result type for cue operations.
pub type Result<T> = std::result::Result<T, CueError>;

/// Errors from scheduling or playing cues.
#[derive(Debug, thiserror::Error)]
pub enum CueError {
    /// Scheduling needs a tokio runtime on the current thread
    #[error("no tokio runtime available to schedule cues")]
    NoRuntime,

    /// The platform failed to play a cue
    #[error("failed to play {cue}: {reason}")]
    Playback {
        /// Cue name
        cue: &'static str,
        /// Platform message
        reason: String,
    },
}
