// =============================================================================
// Signals Module
// =============================================================================
//
// Decision pipeline from a bar series to an optional directional call:
// - Indicator snapshot (latest values plus the prior crossover pair)
// - Gating, confidence scoring, rationale and level annotation

pub mod engine;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod fixtures;

pub use engine::{level_note, score_confidence, SignalEngine};
pub use snapshot::IndicatorSnapshot;
