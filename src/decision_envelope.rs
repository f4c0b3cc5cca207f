// =============================================================================
// Decision Envelope: auditable record of every evaluation in a scan
// =============================================================================
//
// A scan never fails as a whole.  Each instrument gets one envelope stating
// what happened to it: a signal, no qualifying signal, a signal filtered by
// the confidence floor, not enough history, a data-feed failure, or an
// evaluation task that died before reporting.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{Confidence, Signal};

/// What a single evaluation produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Signal { signal: Signal },
    /// No condition set qualified, or the market was filtered as low volatility.
    NoSignal,
    /// A signal was produced but fell below the scan's confidence floor.
    Filtered {
        confidence: Confidence,
        min_confidence: Confidence,
    },
    InsufficientData { required: usize, available: usize },
    FeedError { reason: String },
    /// The evaluation task panicked or was cancelled.
    TaskFailed { reason: String },
}

impl Outcome {
    /// Short label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Signal { .. } => "SIGNAL",
            Self::NoSignal => "NO_SIGNAL",
            Self::Filtered { .. } => "FILTERED",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::FeedError { .. } => "FEED_ERROR",
            Self::TaskFailed { .. } => "TASK_FAILED",
        }
    }
}

impl From<EngineError> for Outcome {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InsufficientData {
                required,
                available,
            } => Self::InsufficientData {
                required,
                available,
            },
            other => Self::FeedError {
                reason: other.to_string(),
            },
        }
    }
}

/// Complete record of one instrument's evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEnvelope {
    /// Unique identifier for this decision (UUID v4).
    pub id: Uuid,

    /// Instrument id the decision pertains to.
    pub instrument_id: String,

    #[serde(flatten)]
    pub outcome: Outcome,

    pub evaluated_at: DateTime<Utc>,
}

impl DecisionEnvelope {
    pub fn new(instrument_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument_id: instrument_id.into(),
            outcome,
            evaluated_at: Utc::now(),
        }
    }

    /// Build the envelope for a finished evaluation, applying the scan's
    /// confidence floor.
    pub fn from_evaluation(
        instrument_id: impl Into<String>,
        result: Result<Option<Signal>, EngineError>,
        min_confidence: Confidence,
    ) -> Self {
        let outcome = match result {
            Ok(Some(signal)) if signal.confidence < min_confidence => Outcome::Filtered {
                confidence: signal.confidence,
                min_confidence,
            },
            Ok(Some(signal)) => Outcome::Signal { signal },
            Ok(None) => Outcome::NoSignal,
            Err(err) => Outcome::from(err),
        };
        Self::new(instrument_id, outcome)
    }

    pub fn signal(&self) -> Option<&Signal> {
        match &self.outcome {
            Outcome::Signal { signal } => Some(signal),
            _ => None,
        }
    }

    pub fn into_signal(self) -> Option<Signal> {
        match self.outcome {
            Outcome::Signal { signal } => Some(signal),
            _ => None,
        }
    }
}
