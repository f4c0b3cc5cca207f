// =============================================================================
// Signal Service: per-instrument entry point
// =============================================================================
//
// The only layer that knows about instruments rather than bare series.
//
// Pipeline for `evaluate(instrument_id)`:
//   1. Map the instrument id to the provider symbol (catalog lookup)
//   2. Fetch `lookback_bars` of `timeframe` bars from the data feed
//   3. Fewer than `min_bars` bars  -> InsufficientData
//   4. Classify, gate, score, annotate (SignalEngine)
//
// `scan` runs `evaluate` over many instruments on the blocking pool, bounded
// by `max_concurrent_evaluations`, and returns one DecisionEnvelope each.
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::decision_envelope::{DecisionEnvelope, Outcome};
use crate::error::{EngineError, Result};
use crate::instruments;
use crate::market_data::DataFeed;
use crate::runtime_config::EngineConfig;
use crate::signals::SignalEngine;
use crate::types::Signal;

pub struct SignalService {
    feed: Arc<dyn DataFeed>,
    config: EngineConfig,
    engine: SignalEngine,
}

impl SignalService {
    /// Validates `config` before accepting it.
    pub fn new(feed: Arc<dyn DataFeed>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let engine = SignalEngine::new(&config)?;
        for id in &config.instruments {
            if let Err(err) = instruments::require(id) {
                warn!(error = %err, "id will be sent to the feed as its own symbol");
            }
        }
        Ok(Self {
            feed,
            config,
            engine,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one instrument now.
    ///
    /// `Ok(None)` means no qualifying signal.  Feed failures come back as
    /// `EngineError::Feed` untouched; nothing here retries.
    pub fn evaluate(&self, instrument_id: &str) -> Result<Option<Signal>> {
        let symbol = instruments::symbol_for(instrument_id);
        let series = self
            .feed
            .get_series(symbol, &self.config.timeframe, self.config.lookback_bars)
            .map_err(EngineError::Feed)?;

        debug!(
            instrument = instrument_id,
            symbol,
            bars = series.len(),
            "series fetched"
        );

        self.engine.evaluate_series(instrument_id, &series, Utc::now())
    }

    /// Evaluate every id in `ids`, at most `max_concurrent_evaluations` at a
    /// time.  Envelopes come back in input order.
    pub async fn scan(self: Arc<Self>, ids: Vec<String>) -> Vec<DecisionEnvelope> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_evaluations));
        let min_confidence = self.config.min_confidence;

        let tasks = ids.iter().cloned().map(|id| {
            let service = Arc::clone(&self);
            let permits = Arc::clone(&permits);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || service.evaluate(&id)).await
            })
        });
        let results = join_all(tasks).await;

        let mut envelopes = Vec::with_capacity(results.len());
        for (id, joined) in ids.iter().zip(results) {
            let envelope = match joined {
                Ok(Ok(result)) => DecisionEnvelope::from_evaluation(id, result, min_confidence),
                Ok(Err(join_err)) | Err(join_err) => DecisionEnvelope::new(
                    id,
                    Outcome::TaskFailed {
                        reason: join_err.to_string(),
                    },
                ),
            };
            match &envelope.outcome {
                Outcome::FeedError { reason } => {
                    warn!(instrument = %id, %reason, "feed error");
                }
                Outcome::TaskFailed { reason } => {
                    warn!(instrument = %id, %reason, "evaluation task failed");
                }
                _ => {}
            }
            envelopes.push(envelope);
        }

        let signals = envelopes.iter().filter(|e| e.signal().is_some()).count();
        info!(evaluated = envelopes.len(), signals, "scan complete");
        envelopes
    }

    /// Scan the configured instrument list.
    pub async fn scan_configured(self: Arc<Self>) -> Vec<DecisionEnvelope> {
        let ids = self.config.instruments.clone();
        self.scan(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Series;
    use crate::signals::fixtures;
    use crate::types::{Confidence, Direction};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Feed backed by fixed series per symbol; unknown symbols fail.
    struct FixtureFeed {
        series: HashMap<&'static str, Series>,
        requests: Mutex<Vec<(String, String, usize)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FixtureFeed {
        fn new() -> Self {
            let short = fixtures::bullish().tail(40);
            Self {
                series: HashMap::from([
                    ("EURUSD", fixtures::bullish()),
                    ("XAUUSD", fixtures::bearish()),
                    ("GBPUSD", fixtures::flat()),
                    ("DAX30", short),
                    ("GBPJPY", fixtures::modest_bullish()),
                ]),
                requests: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl DataFeed for FixtureFeed {
        fn get_series(
            &self,
            symbol: &str,
            timeframe: &str,
            bar_count: usize,
        ) -> anyhow::Result<Series> {
            if symbol == "BROKEN" {
                panic!("feed crashed on {symbol}");
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.requests
                .lock()
                .push((symbol.to_string(), timeframe.to_string(), bar_count));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no data for {symbol}"))
        }
    }

    fn service(feed: Arc<FixtureFeed>, config: EngineConfig) -> Arc<SignalService> {
        Arc::new(SignalService::new(feed, config).unwrap())
    }

    #[test]
    fn evaluate_maps_instrument_to_symbol() {
        let feed = Arc::new(FixtureFeed::new());
        let svc = service(Arc::clone(&feed), EngineConfig::default());
        let signal = svc.evaluate("EUR/USD").unwrap().unwrap();
        assert_eq!(signal.instrument_id, "EUR/USD");
        assert_eq!(signal.direction, Direction::Up);
        assert_eq!(signal.validity_secs(), 60);
        let requests = feed.requests.lock();
        assert_eq!(requests[0], ("EURUSD".to_string(), "1m".to_string(), 500));
    }

    #[test]
    fn evaluate_outcomes() {
        let svc = service(Arc::new(FixtureFeed::new()), EngineConfig::default());
        assert_eq!(
            svc.evaluate("GOLD").unwrap().unwrap().direction,
            Direction::Down
        );
        assert!(svc.evaluate("GBP/USD").unwrap().is_none());
        assert!(svc.evaluate("DAX").unwrap_err().is_insufficient_data());
        assert!(matches!(
            svc.evaluate("MOON/USD"),
            Err(EngineError::Feed(_))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            max_concurrent_evaluations: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            SignalService::new(Arc::new(FixtureFeed::new()), config),
            Err(EngineError::Config(_))
        ));
    }

    #[tokio::test]
    async fn scan_preserves_order_and_records_outcomes() {
        let svc = service(Arc::new(FixtureFeed::new()), EngineConfig::default());
        let ids: Vec<String> = ["EUR/USD", "GBP/USD", "DAX", "MOON/USD", "GOLD"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let envelopes = svc.scan(ids.clone()).await;
        let got: Vec<_> = envelopes.iter().map(|e| e.instrument_id.clone()).collect();
        assert_eq!(got, ids);

        let labels: Vec<_> = envelopes.iter().map(|e| e.outcome.label()).collect();
        assert_eq!(
            labels,
            vec!["SIGNAL", "NO_SIGNAL", "INSUFFICIENT_DATA", "FEED_ERROR", "SIGNAL"]
        );
    }

    #[tokio::test]
    async fn scan_respects_concurrency_limit() {
        let feed = Arc::new(FixtureFeed::new());
        let config = EngineConfig {
            max_concurrent_evaluations: 2,
            ..EngineConfig::default()
        };
        let svc = service(Arc::clone(&feed), config);
        let ids = vec!["EUR/USD".to_string(); 12];
        let envelopes = svc.scan(ids).await;
        assert_eq!(envelopes.len(), 12);
        assert!(feed.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn scan_applies_confidence_floor() {
        let config = EngineConfig {
            min_confidence: Confidence::High,
            instruments: vec!["EUR/USD".into(), "GBP/JPY".into(), "GOLD".into()],
            ..EngineConfig::default()
        };
        let svc = service(Arc::new(FixtureFeed::new()), config);
        let envelopes = svc.scan_configured().await;

        let labels: Vec<_> = envelopes.iter().map(|e| e.outcome.label()).collect();
        assert_eq!(labels, vec!["SIGNAL", "FILTERED", "SIGNAL"]);
        assert!(matches!(
            envelopes[1].outcome,
            Outcome::Filtered {
                confidence: Confidence::Medium,
                min_confidence: Confidence::High
            }
        ));
    }

    #[tokio::test]
    async fn medium_signal_passes_default_floor() {
        let svc = service(Arc::new(FixtureFeed::new()), EngineConfig::default());
        let envelopes = svc.scan(vec!["GBP/JPY".into()]).await;
        let signal = envelopes[0].signal().expect("LOW floor keeps MEDIUM signals");
        assert_eq!(signal.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn panicking_evaluation_is_task_failure() {
        let svc = service(Arc::new(FixtureFeed::new()), EngineConfig::default());
        let envelopes = svc
            .scan(vec!["BROKEN".into(), "EUR/USD".into()])
            .await;
        assert!(matches!(envelopes[0].outcome, Outcome::TaskFailed { .. }));
        assert_eq!(envelopes[0].outcome.label(), "TASK_FAILED");
        assert_eq!(envelopes[1].outcome.label(), "SIGNAL");
    }

    #[test]
    fn unknown_configured_instruments_are_accepted() {
        let config = EngineConfig {
            instruments: vec!["EUR/USD".into(), "MOON/USD".into()],
            ..EngineConfig::default()
        };
        assert!(SignalService::new(Arc::new(FixtureFeed::new()), config).is_ok());
    }
}
