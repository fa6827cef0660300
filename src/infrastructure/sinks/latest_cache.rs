use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::SignalSink;
use crate::domain::signal::Signal;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::error;

/// Keeps the most recent signal per symbol and timeframe for on-demand
/// reads.
pub struct LatestSignalCache {
    entries: RwLock<HashMap<(String, Timeframe), Signal>>,
}

impl LatestSignalCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, symbol: &str, timeframe: Timeframe) -> Option<Signal> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("LatestSignalCache: lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        };
        entries.get(&(symbol.to_string(), timeframe)).cloned()
    }

    pub fn all(&self) -> Vec<Signal> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("LatestSignalCache: lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        };
        entries.values().cloned().collect()
    }
}

impl Default for LatestSignalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSink for LatestSignalCache {
    fn publish(&self, signal: &Signal) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("LatestSignalCache: lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        entries.insert((signal.symbol.clone(), signal.timeframe), signal.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{Direction, TradingSession};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn make_signal(symbol: &str, direction: Direction) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            timeframe: Timeframe::OneHour,
            direction,
            price: dec!(2400.00),
            entry: None,
            stop_loss: None,
            take_profit: None,
            rsi: Some(dec!(50.00)),
            support: None,
            resistance: None,
            session: TradingSession::Asian,
            generated_at: Utc::now(),
            stale: false,
        }
    }

    #[test]
    fn test_cache_tracks_one_entry_per_unit() {
        let cache = LatestSignalCache::new();
        cache.publish(&make_signal("frxXAUUSD", Direction::Hold));
        cache.publish(&make_signal("frxEURUSD", Direction::Hold));

        assert_eq!(cache.all().len(), 2);
        assert!(cache.get("frxXAUUSD", Timeframe::OneHour).is_some());
        assert!(cache.get("frxXAUUSD", Timeframe::FiveMin).is_none());
    }

    #[test]
    fn test_newer_signal_replaces_older() {
        let cache = LatestSignalCache::new();
        cache.publish(&make_signal("frxXAUUSD", Direction::Hold));
        cache.publish(&make_signal("frxXAUUSD", Direction::Buy));

        let latest = cache.get("frxXAUUSD", Timeframe::OneHour);
        assert_eq!(latest.map(|s| s.direction), Some(Direction::Buy));
        assert_eq!(cache.all().len(), 1);
    }
}
