use crate::domain::errors::DataSourceError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{Candle, Tick};
use crate::domain::signal::Signal;
use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

// Need async_trait for async functions in traits
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches up to `count` closed candles, oldest first
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataSourceError>;

    /// Opens a live tick stream for one symbol. The stream ends when the
    /// returned receiver yields `None`; the caller decides whether to
    /// resubscribe.
    async fn subscribe_ticks(&self, symbol: &str) -> Result<Receiver<Tick>, DataSourceError>;
}

/// Terminal consumer of evaluated signals. Implementations must not block
/// for long and must swallow their own delivery failures.
pub trait SignalSink: Send + Sync {
    fn publish(&self, signal: &Signal);
}
