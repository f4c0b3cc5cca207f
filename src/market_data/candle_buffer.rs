use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

// ---------------------------------------------------------------------------
// Series -- fixed-capacity sliding window for one instrument
// ---------------------------------------------------------------------------

/// Ordered OHLCV window with a fixed capacity.
///
/// Timestamps are strictly increasing.  Appending to a full window evicts the
/// oldest bar, so both operations are O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl Series {
    /// Create an empty window holding at most `capacity` bars.
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a window from history (oldest first).  Bars that break timestamp
    /// ordering are dropped; only the newest `capacity` survive.
    pub fn from_bars(capacity: usize, bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut series = Self::new(capacity);
        for bar in bars {
            series.push(bar);
        }
        series
    }

    /// Append `bar`, evicting the oldest bar when full.
    ///
    /// Returns `false` (and leaves the window untouched) when `bar` is not
    /// strictly newer than the current last bar.
    pub fn push(&mut self, bar: Bar) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if let Some(last) = self.bars.back() {
            if bar.timestamp <= last.timestamp {
                warn!(
                    last = %last.timestamp,
                    incoming = %bar.timestamp,
                    "out-of-order bar rejected"
                );
                return false;
            }
        }
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
        true
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.bars.iter()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Copy of the newest `count` bars as a new window of the same capacity.
    pub fn tail(&self, count: usize) -> Self {
        let start = self.bars.len().saturating_sub(count);
        Self::from_bars(self.capacity, self.bars.iter().skip(start).copied())
    }
}

// ---------------------------------------------------------------------------
// CandleBuffer -- thread-safe sliding windows keyed by symbol
// ---------------------------------------------------------------------------

/// Thread-safe store of one [`Series`] per provider symbol, fed by a live
/// data source.
pub struct CandleBuffer {
    series: RwLock<HashMap<String, Series>>,
    max_bars: usize,
}

impl CandleBuffer {
    /// Create a buffer that retains at most `max_bars` bars per symbol.
    pub fn new(max_bars: usize) -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
            max_bars,
        }
    }

    /// Append a bar for `symbol`.  Returns whether it was accepted.
    pub fn update(&self, symbol: &str, bar: Bar) -> bool {
        let mut map = self.series.write();
        let series = map
            .entry(symbol.to_string())
            .or_insert_with(|| Series::new(self.max_bars));
        let accepted = series.push(bar);
        if accepted {
            debug!(symbol, close = bar.close, bars = series.len(), "bar appended");
        }
        accepted
    }

    /// The newest `count` bars for `symbol` (empty when unknown).
    pub fn snapshot(&self, symbol: &str, count: usize) -> Series {
        let map = self.series.read();
        match map.get(symbol) {
            Some(series) => series.tail(count),
            None => Series::new(self.max_bars),
        }
    }

    /// Number of bars currently held for `symbol`.
    pub fn count(&self, symbol: &str) -> usize {
        self.series.read().get(symbol).map_or(0, Series::len)
    }

    pub fn last_close(&self, symbol: &str) -> Option<f64> {
        self.series.read().get(symbol).and_then(Series::last_close)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_bar(minute: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn sliding_window_evicts_oldest() {
        let mut series = Series::new(3);
        for i in 0..5 {
            assert!(series.push(sample_bar(i, 100.0 + i as f64)));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![102.0, 103.0, 104.0]);
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut series = Series::new(10);
        assert!(series.push(sample_bar(5, 1.0)));
        assert!(!series.push(sample_bar(5, 2.0)));
        assert!(!series.push(sample_bar(4, 3.0)));
        assert_eq!(series.len(), 1);
        assert_eq!(series.last_close(), Some(1.0));
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut series = Series::new(0);
        assert!(!series.push(sample_bar(0, 1.0)));
        assert!(series.is_empty());
    }

    #[test]
    fn column_accessors() {
        let series = Series::from_bars(10, (0..3).map(|i| sample_bar(i, 10.0 * (i + 1) as f64)));
        assert_eq!(series.closes(), vec![10.0, 20.0, 30.0]);
        assert_eq!(series.highs(), vec![11.0, 21.0, 31.0]);
        assert_eq!(series.lows(), vec![9.0, 19.0, 29.0]);
        assert_eq!(series.volumes(), vec![100.0; 3]);
    }

    #[test]
    fn tail_keeps_newest() {
        let series = Series::from_bars(10, (0..6).map(|i| sample_bar(i, i as f64)));
        let tail = series.tail(2);
        assert_eq!(tail.closes(), vec![4.0, 5.0]);
        assert_eq!(tail.capacity(), 10);
    }

    #[test]
    fn buffer_per_symbol_windows() {
        let buf = CandleBuffer::new(3);
        for i in 0..5 {
            buf.update("EURUSD", sample_bar(i, 1.0 + i as f64));
        }
        buf.update("BTCUSD", sample_bar(0, 40_000.0));

        assert_eq!(buf.count("EURUSD"), 3);
        assert_eq!(buf.count("BTCUSD"), 1);
        assert_eq!(buf.snapshot("EURUSD", 2).closes(), vec![4.0, 5.0]);
        assert_eq!(buf.last_close("BTCUSD"), Some(40_000.0));
    }

    #[test]
    fn unknown_symbol_is_empty() {
        let buf = CandleBuffer::new(10);
        assert!(buf.snapshot("XYZ", 5).is_empty());
        assert_eq!(buf.last_close("XYZ"), None);
    }
}
