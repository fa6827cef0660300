//! Configuration module for sigwatch.
//!
//! All runtime settings come from environment variables. The watchlist,
//! strategy selection and retry policy are parsed into typed values once at
//! startup; anything invalid is fatal.

use crate::domain::errors::ConfigError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::default_precision;
use crate::domain::signal::StrategyPolicy;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_WATCHLIST: &str = "frxXAUUSD:1h,frxEURUSD:1h,cryBTCUSD:15m:stream";
const DEFAULT_RETENTION: usize = 200;

/// How a work unit acquires market data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// Re-fetch the whole candle history on a fixed interval
    Poll,
    /// Subscribe to live ticks and build candles locally
    Stream,
}

impl FromStr for AcquisitionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poll" => Ok(AcquisitionMode::Poll),
            "stream" => Ok(AcquisitionMode::Stream),
            _ => Err(ConfigError::InvalidMode { value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionMode::Poll => write!(f, "poll"),
            AcquisitionMode::Stream => write!(f, "stream"),
        }
    }
}

/// One watchlist entry: `SYMBOL:TIMEFRAME[:MODE[:RETENTION[:PRECISION]]]`
///
/// Mode defaults to `poll`, retention to 200 candles and precision to the
/// symbol's default display precision.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchItem {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub mode: AcquisitionMode,
    pub retention: usize,
    pub precision: u32,
}

impl FromStr for WatchItem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 5 {
            return Err(ConfigError::InvalidWatchlist {
                entry: s.to_string(),
                reason: "expected SYMBOL:TIMEFRAME[:MODE[:RETENTION[:PRECISION]]]".to_string(),
            });
        }

        let symbol = parts[0].to_string();
        if symbol.is_empty() {
            return Err(ConfigError::InvalidWatchlist {
                entry: s.to_string(),
                reason: "symbol is empty".to_string(),
            });
        }

        let timeframe = parts[1].parse()?;

        let mode = match parts.get(2) {
            Some(raw) if !raw.is_empty() => raw.parse()?,
            _ => AcquisitionMode::Poll,
        };

        let retention = match parts.get(3) {
            Some(raw) if !raw.is_empty() => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidWatchlist {
                        entry: s.to_string(),
                        reason: format!("invalid retention '{}'", raw),
                    });
                }
            },
            _ => DEFAULT_RETENTION,
        };

        let precision = match parts.get(4) {
            Some(raw) if !raw.is_empty() => match raw.parse::<u32>() {
                Ok(p) => p,
                Err(_) => {
                    return Err(ConfigError::InvalidWatchlist {
                        entry: s.to_string(),
                        reason: format!("invalid precision '{}'", raw),
                    });
                }
            },
            _ => default_precision(&symbol),
        };

        Ok(Self {
            symbol,
            timeframe,
            mode,
            retention,
            precision,
        })
    }
}

/// Backoff parameters applied to failed data source calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    /// Consecutive failures before the unit is considered degraded
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 3,
            max_delay: Duration::from_secs(90),
            max_attempts: 7,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub watchlist: Vec<WatchItem>,
    pub strategy: StrategyPolicy,
    pub rsi_period: usize,
    /// Restrict support/resistance to the newest N candles when set
    pub sr_window: Option<usize>,
    pub poll_interval: Duration,
    pub stream_throttle: Duration,
    pub retry: RetryPolicy,
    pub signal_log_path: PathBuf,
    pub pip_stop: Decimal,
    pub pip_target: Decimal,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_watchlist = env::var("WATCHLIST").unwrap_or_else(|_| DEFAULT_WATCHLIST.to_string());
        let watchlist = parse_watchlist(&raw_watchlist)?;

        let strategy_str = env::var("STRATEGY").unwrap_or_else(|_| "fib_rsi".to_string());
        let strategy = StrategyPolicy::from_str(&strategy_str)?;

        let rsi_period = parse_usize("RSI_PERIOD", 14)?;
        if rsi_period == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RSI_PERIOD".to_string(),
                value: "0".to_string(),
            });
        }

        let sr_window = match env::var("SR_WINDOW") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SR_WINDOW".to_string(),
                        value: raw,
                    });
                }
            },
            Err(_) => None,
        };

        let retry = RetryPolicy {
            base_delay: Duration::from_secs(parse_u64("RETRY_BASE_SECS", 1)?),
            multiplier: parse_u32("RETRY_MULTIPLIER", 3)?,
            max_delay: Duration::from_secs(parse_u64("RETRY_MAX_SECS", 90)?),
            max_attempts: parse_u32("RETRY_MAX_ATTEMPTS", 7)?,
        };
        if retry.multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RETRY_MULTIPLIER".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            watchlist,
            strategy,
            rsi_period,
            sr_window,
            poll_interval: Duration::from_secs(parse_u64("POLL_INTERVAL_SECS", 300)?),
            stream_throttle: Duration::from_secs(parse_u64("STREAM_THROTTLE_SECS", 60)?),
            retry,
            signal_log_path: env::var("SIGNAL_LOG_PATH")
                .unwrap_or_else(|_| "signals.csv".to_string())
                .into(),
            pip_stop: parse_decimal("RSI_PIPS_STOP", "0.0050")?,
            pip_target: parse_decimal("RSI_PIPS_TARGET", "0.0100")?,
        })
    }
}

fn parse_watchlist(raw: &str) -> Result<Vec<WatchItem>, ConfigError> {
    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(WatchItem::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if items.is_empty() {
        return Err(ConfigError::EmptyWatchlist);
    }

    for (i, item) in items.iter().enumerate() {
        let duplicate = items[..i]
            .iter()
            .any(|other| other.symbol == item.symbol && other.timeframe == item.timeframe);
        if duplicate {
            return Err(ConfigError::DuplicateUnit {
                symbol: item.symbol.clone(),
                timeframe: item.timeframe.to_string(),
            });
        }
    }

    Ok(items)
}

fn parse_usize(key: &str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_u32(key: &str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_decimal(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_watch_item_minimal_entry_uses_defaults() {
        let item: WatchItem = "frxEURUSD:1h".parse().unwrap();
        assert_eq!(item.symbol, "frxEURUSD");
        assert_eq!(item.timeframe, Timeframe::OneHour);
        assert_eq!(item.mode, AcquisitionMode::Poll);
        assert_eq!(item.retention, 200);
        assert_eq!(item.precision, 5);
    }

    #[test]
    fn test_watch_item_full_entry() {
        let item: WatchItem = "frxXAUUSD:15m:stream:120:3".parse().unwrap();
        assert_eq!(item.symbol, "frxXAUUSD");
        assert_eq!(item.timeframe, Timeframe::FifteenMin);
        assert_eq!(item.mode, AcquisitionMode::Stream);
        assert_eq!(item.retention, 120);
        assert_eq!(item.precision, 3);
    }

    #[test]
    fn test_watch_item_infers_precision_from_symbol() {
        let item: WatchItem = "frxXAUUSD:1h".parse().unwrap();
        assert_eq!(item.precision, 2);
    }

    #[test]
    fn test_watch_item_rejects_bad_entries() {
        assert!("frxEURUSD".parse::<WatchItem>().is_err());
        assert!(":1h".parse::<WatchItem>().is_err());
        assert!("frxEURUSD:2h".parse::<WatchItem>().is_err());
        assert!("frxEURUSD:1h:push".parse::<WatchItem>().is_err());
        assert!("frxEURUSD:1h:poll:0".parse::<WatchItem>().is_err());
        assert!("frxEURUSD:1h:poll:200:five".parse::<WatchItem>().is_err());
    }

    #[test]
    fn test_parse_watchlist_rejects_duplicates() {
        let err = parse_watchlist("frxEURUSD:1h,frxEURUSD:1h:stream").unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        // Same symbol on a different timeframe is fine
        assert!(parse_watchlist("frxEURUSD:1h,frxEURUSD:15m").is_ok());
    }

    #[test]
    fn test_parse_watchlist_rejects_empty() {
        assert!(parse_watchlist("").is_err());
        assert!(parse_watchlist(" , ,").is_err());
    }

    #[test]
    fn test_config_from_env_defaults() {
        let config = Config::from_env().expect("Should parse with defaults");
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.stream_throttle, Duration::from_secs(60));
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.retry.multiplier, 3);
        assert_eq!(config.retry.max_delay, Duration::from_secs(90));
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.pip_stop, dec!(0.0050));
        assert_eq!(config.pip_target, dec!(0.0100));
        assert!(!config.watchlist.is_empty());
    }
}
