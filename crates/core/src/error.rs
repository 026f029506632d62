//! Configuration errors.

/// Result alias for configuration validation.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A path or tolerance configuration that a round cannot start with.
///
/// These are caller bugs (the path generator produced something unusable),
/// never end-user errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Polyline with fewer than two points
    #[error("polyline needs at least 2 points, got {found}")]
    TooFewPoints {
        /// Number of points supplied
        found: usize,
    },

    /// Polyline whose points all coincide
    #[error("polyline has zero total length")]
    ZeroLength,

    /// Arc radius that is zero, negative or not finite
    #[error("arc radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// NaN or infinite coordinate or angle in the path
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// Tolerance or policy value outside its allowed range
    #[error("invalid {field}: {value}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Value that was rejected
        value: f64,
    },
}
