//! Platform seam for playing cues.

use async_trait::async_trait;

use crate::cue::Cue;
use crate::error::Result;

/// Plays cues on the device (audio, speech, vibration).
#[async_trait]
pub trait CuePlayer: Send + Sync {
    /// Play one cue to completion.
    async fn play(&self, cue: &Cue) -> Result<()>;
}
