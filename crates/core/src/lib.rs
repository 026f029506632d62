//! pathtrace core data models.
//!
//! This crate defines the reference curves, tolerances, policies and
//! per-attempt state shared by the tracing engine and its callers.

#![warn(missing_docs)]

// Identities
mod id;

// Geometry
mod point;
mod path;

// Round configuration and state
mod config;
mod state;
mod event;
mod report;

mod error;

// Re-exports
pub use id::{RoundId, CueId};

pub use point::{Point, Bounds};
pub use path::{PathModel, ArcPath, ArcDirection};

pub use config::{ToleranceConfig, RoundPolicy, SuccessPolicy, StartPolicy, ReleasePolicy};
pub use state::{TrackState, RoundPhase};
pub use event::TrackEvent;
pub use report::RoundReport;

pub use error::{ConfigError, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
