// =============================================================================
// Instrument Catalog
// =============================================================================
//
// Static lookup from the instrument ids shown to users ("EUR/USD", "GOLD") to
// the symbols the data provider understands ("EURUSD", "XAUUSD").

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentCategory {
    Forex,
    Cryptocurrency,
    Commodity,
    StockIndex,
}

impl fmt::Display for InstrumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forex => write!(f, "Forex"),
            Self::Cryptocurrency => write!(f, "Cryptocurrency"),
            Self::Commodity => write!(f, "Commodity"),
            Self::StockIndex => write!(f, "Stock Index"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub id: &'static str,
    pub symbol: &'static str,
    pub category: InstrumentCategory,
}

const fn entry(id: &'static str, symbol: &'static str, category: InstrumentCategory) -> Instrument {
    Instrument {
        id,
        symbol,
        category,
    }
}

use InstrumentCategory::{Commodity, Cryptocurrency, Forex, StockIndex};

pub static CATALOG: &[Instrument] = &[
    // Forex majors
    entry("EUR/USD", "EURUSD", Forex),
    entry("GBP/USD", "GBPUSD", Forex),
    entry("USD/JPY", "USDJPY", Forex),
    entry("USD/CHF", "USDCHF", Forex),
    entry("AUD/USD", "AUDUSD", Forex),
    entry("USD/CAD", "USDCAD", Forex),
    entry("NZD/USD", "NZDUSD", Forex),
    entry("EUR/GBP", "EURGBP", Forex),
    entry("EUR/JPY", "EURJPY", Forex),
    // Forex minors
    entry("GBP/JPY", "GBPJPY", Forex),
    entry("GBP/CHF", "GBPCHF", Forex),
    entry("EUR/CHF", "EURCHF", Forex),
    entry("AUD/JPY", "AUDJPY", Forex),
    entry("AUD/CAD", "AUDCAD", Forex),
    entry("CAD/JPY", "CADJPY", Forex),
    // Crypto
    entry("BTC/USD", "BTCUSD", Cryptocurrency),
    entry("ETH/USD", "ETHUSD", Cryptocurrency),
    entry("LTC/USD", "LTCUSD", Cryptocurrency),
    entry("BCH/USD", "BCHUSD", Cryptocurrency),
    entry("XRP/USD", "XRPUSD", Cryptocurrency),
    entry("ADA/USD", "ADAUSD", Cryptocurrency),
    // Commodities
    entry("GOLD", "XAUUSD", Commodity),
    entry("SILVER", "XAGUSD", Commodity),
    entry("OIL", "CRUDE", Commodity),
    entry("NATURAL_GAS", "NATGAS", Commodity),
    // Indices
    entry("S&P500", "SPX500", StockIndex),
    entry("NASDAQ", "NAS100", StockIndex),
    entry("DOW", "DJ30", StockIndex),
    entry("FTSE", "FTSE100", StockIndex),
    entry("DAX", "DAX30", StockIndex),
    entry("CAC", "CAC40", StockIndex),
];

pub fn all() -> impl Iterator<Item = &'static Instrument> {
    CATALOG.iter()
}

pub fn lookup(id: &str) -> Option<&'static Instrument> {
    CATALOG.iter().find(|i| i.id == id)
}

/// Strict lookup: unknown ids are an error.
pub fn require(id: &str) -> Result<&'static Instrument> {
    lookup(id).ok_or_else(|| EngineError::UnknownInstrument(id.to_string()))
}

/// Provider symbol for `id`; ids outside the catalog pass through unchanged.
pub fn symbol_for(id: &str) -> &str {
    lookup(id).map_or(id, |i| i.symbol)
}

pub fn by_category(category: InstrumentCategory) -> impl Iterator<Item = &'static Instrument> {
    CATALOG.iter().filter(move |i| i.category == category)
}

/// Uniformly pick a catalog entry.
pub fn random_instrument<R: Rng + ?Sized>(rng: &mut R) -> &'static Instrument {
    // CATALOG is a non-empty static.
    CATALOG.choose(rng).unwrap_or(&CATALOG[0])
}
