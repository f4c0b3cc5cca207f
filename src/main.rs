// =============================================================================
// Quotex Signals: scan binary
// =============================================================================
//
// Loads the engine config, scans the configured instruments against the
// simulated feed and prints a card for every signal.  With
// SIGNAL_SCAN_INTERVAL_SECS set, keeps scanning on that interval.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quotex_signals::{DecisionEnvelope, EngineConfig, SignalService, SimulatedFeed};

const DEFAULT_CONFIG_PATH: &str = "signal_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("SIGNAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Override instruments from env if available.
    if let Ok(ids) = std::env::var("SIGNAL_INSTRUMENTS") {
        let ids: Vec<String> = ids
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !ids.is_empty() {
            config.instruments = ids;
        }
    }

    let interval = match std::env::var("SIGNAL_SCAN_INTERVAL_SECS") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("invalid SIGNAL_SCAN_INTERVAL_SECS {raw:?}"))?,
        )
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs),
        Err(_) => None,
    };

    info!(
        instruments = config.instruments.len(),
        timeframe = %config.timeframe,
        min_confidence = %config.min_confidence,
        max_concurrent = config.max_concurrent_evaluations,
        "Signal scanner starting"
    );

    // ── 2. Service ───────────────────────────────────────────────────────
    let feed = Arc::new(SimulatedFeed::new());
    let service = Arc::new(SignalService::new(feed, config).context("invalid engine config")?);

    // ── 3. Scan ──────────────────────────────────────────────────────────
    let Some(period) = interval else {
        report(&Arc::clone(&service).scan_configured().await);
        return Ok(());
    };

    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                report(&Arc::clone(&service).scan_configured().await);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                return Ok(());
            }
        }
    }
}

fn report(envelopes: &[DecisionEnvelope]) {
    let mut printed = 0;
    for signal in envelopes.iter().filter_map(DecisionEnvelope::signal) {
        println!("{signal}\n");
        printed += 1;
    }
    if printed == 0 {
        println!("No qualifying signal right now.");
    }
}
