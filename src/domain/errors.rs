use thiserror::Error;

/// Errors raised by market data adapters. Work units treat all of these as
/// retryable and respond with exponential backoff.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Network failure: {reason}")]
    Network { reason: String },

    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Protocol error: {reason}")]
    Protocol { reason: String },

    #[error("Malformed payload for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },
}

/// Errors raised while loading configuration. These are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid timeframe: '{value}'. Valid options: 1m, 5m, 15m, 30m, 1h, 4h, 1d")]
    InvalidTimeframe { value: String },

    #[error("Invalid watchlist entry '{entry}': {reason}")]
    InvalidWatchlist { entry: String, reason: String },

    #[error("Duplicate watchlist entry: {symbol} {timeframe}")]
    DuplicateUnit { symbol: String, timeframe: String },

    #[error("WATCHLIST must contain at least one entry")]
    EmptyWatchlist,

    #[error("Invalid strategy: '{value}'. Valid options: fib_rsi, liquidity_grab, structure_shift, rsi_pips")]
    InvalidStrategy { value: String },

    #[error("Invalid acquisition mode: '{value}'. Valid options: poll, stream")]
    InvalidMode { value: String },

    #[error("Failed to parse {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
