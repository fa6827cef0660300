use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{Candle, Tick};
use rust_decimal::Decimal;
use tracing::debug;

#[derive(Debug)]
struct CandleBuilder {
    open_time: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    tick_count: u32,
}

impl CandleBuilder {
    fn new(open_time: i64, price: Decimal) -> Self {
        Self {
            open_time,
            open: price,
            high: price,
            low: price,
            close: price,
            tick_count: 1,
        }
    }

    fn update(&mut self, price: Decimal) {
        self.tick_count += 1;
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
    }

    fn build(&self, symbol: &str) -> Candle {
        Candle {
            symbol: symbol.to_string(),
            open_time: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: Decimal::from(self.tick_count),
        }
    }
}

/// Folds a live tick stream into fixed-window candles for one symbol and
/// timeframe. The feed carries no trade sizes, so volume counts ticks.
pub struct CandleAggregator {
    symbol: String,
    timeframe: Timeframe,
    builder: Option<CandleBuilder>,
}

impl CandleAggregator {
    pub fn new(symbol: String, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            timeframe,
            builder: None,
        }
    }

    /// Folds one tick in. Returns the completed candle when the tick opens a
    /// new window. Ticks stamped before the open candle's window are dropped.
    pub fn ingest(&mut self, tick: &Tick) -> Option<Candle> {
        let window = self.timeframe.period_start(tick.timestamp);

        match self.builder.as_mut() {
            None => {
                self.builder = Some(CandleBuilder::new(window, tick.price));
                None
            }
            Some(builder) if window < builder.open_time => {
                debug!(
                    "CandleAggregator: {} dropped out-of-order tick at {}",
                    self.symbol, tick.timestamp
                );
                None
            }
            Some(builder) if window == builder.open_time => {
                builder.update(tick.price);
                None
            }
            Some(builder) => {
                let completed = builder.build(&self.symbol);
                *builder = CandleBuilder::new(window, tick.price);
                debug!(
                    "CandleAggregator: {} candle closed → O:{} H:{} L:{} C:{} ticks:{}",
                    self.symbol,
                    completed.open,
                    completed.high,
                    completed.low,
                    completed.close,
                    completed.volume
                );
                Some(completed)
            }
        }
    }

    /// Latest price inside the open candle, if any tick has arrived yet
    pub fn current_price(&self) -> Option<Decimal> {
        self.builder.as_ref().map(|builder| builder.close)
    }
}
