use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed OHLCV candle. `open_time` is the Unix millisecond timestamp of
/// the start of the period, aligned to the timeframe boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A single price observation from a streaming feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub price: Decimal,
}

/// Substrings identifying instruments quoted to 2 decimal places
/// (metals, indices, crypto, synthetics). Everything else is treated
/// as an FX pair quoted to 5.
const TWO_DP_MARKERS: &[&str] = &[
    "XAU", "XAG", "BTC", "ETH", "US30", "NAS", "SPX", "R_", "OIL", "STP",
];

/// Display precision for a symbol when no explicit override is configured
pub fn default_precision(symbol: &str) -> u32 {
    let upper = symbol.to_uppercase();
    if TWO_DP_MARKERS.iter().any(|marker| upper.contains(marker)) {
        2
    } else {
        5
    }
}
