pub mod candle_buffer;
pub mod feed;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use candle_buffer::{Bar, CandleBuffer, Series};
pub use feed::{timeframe_duration, BufferedFeed, DataFeed, SimulatedFeed};
