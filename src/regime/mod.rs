// =============================================================================
// Market Condition Module
// =============================================================================
//
// Trend and volatility classification of a price series.  The volatility
// regime doubles as the engine's sideways-market filter.

pub mod detector;

pub use detector::{
    classify_market, classify_market_with, ConditionWindows, MarketCondition, Trend,
    VolatilityRegime, MIN_CONDITION_BARS,
};
