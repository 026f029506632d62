//! Unique identifiers for rounds and scheduled cues.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a round attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(Ulid);

impl RoundId {
    /// Generate a new RoundId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoundId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a scheduled cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueId(Ulid);

impl CueId {
    /// Generate a new CueId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
