// =============================================================================
// Quotex Signals: technical-analysis signal engine
// =============================================================================
//
// Indicator math, market classification and a deterministic decision
// procedure that turns a bar series into an optional UP/DOWN call with a
// confidence tier and rationale.
// =============================================================================

pub mod decision_envelope;
pub mod error;
pub mod indicators;
pub mod instruments;
pub mod market_data;
pub mod regime;
pub mod runtime_config;
pub mod signals;
pub mod strategy;
pub mod types;

pub use decision_envelope::{DecisionEnvelope, Outcome};
pub use error::{EngineError, Result};
pub use market_data::{Bar, BufferedFeed, CandleBuffer, DataFeed, Series, SimulatedFeed};
pub use runtime_config::{EngineConfig, IndicatorParams};
pub use signals::SignalEngine;
pub use strategy::SignalService;
pub use types::{Confidence, Direction, Signal};
