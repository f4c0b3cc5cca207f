// =============================================================================
// Engine Errors
// =============================================================================
//
// Only two kinds of failure leave the core: a lookback that cannot be met and
// whatever the data-feed collaborator reports.  "No signal" is never an error;
// it is `Ok(None)`.

use thiserror::Error;

/// Errors surfaced by the signal engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The series is shorter than the lookback a computation requires.
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// Strict lookup of an instrument id that is not in the catalog.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Rejected configuration value.
    #[error("invalid config: {0}")]
    Config(String),

    /// Failure reported by the data feed; propagated untouched.
    #[error("data feed error: {0}")]
    Feed(#[from] anyhow::Error),
}

impl EngineError {
    /// Shorthand used by every lookback guard.
    pub fn insufficient(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// `true` when the caller may simply retry on a later cycle.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
