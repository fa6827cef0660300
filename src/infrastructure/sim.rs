use crate::domain::errors::DataSourceError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::types::{Candle, Tick};
use crate::domain::ports::MarketDataSource;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver};
use tokio::time;
use tracing::info;

/// Deterministic market data source for demo runs and tests.
///
/// History is synthesized per (symbol, window) so repeated fetches agree
/// with each other, and the tick stream random-walks from the same chart.
/// `with_clock` decouples the synthetic timestamps from wall time so
/// tests can close large candles in milliseconds. `inject_failures`
/// makes the next N calls fail, for exercising the backoff path.
#[derive(Clone)]
pub struct SimulatedMarketData {
    tick_interval: Duration,
    time_step: Duration,
    fail_next: Arc<AtomicU32>,
}

impl SimulatedMarketData {
    pub fn new() -> Self {
        Self::with_clock(Duration::from_millis(500), Duration::from_millis(500))
    }

    /// Each emitted tick advances the synthetic clock by `time_step`
    /// while waiting `tick_interval` of wall time between ticks
    pub fn with_clock(tick_interval: Duration, time_step: Duration) -> Self {
        Self {
            tick_interval,
            time_step,
            fail_next: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail the next `count` data source calls with a network error
    pub fn inject_failures(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for SimulatedMarketData {
    fn default() -> Self {
        Self::new()
    }
}

fn base_price(symbol: &str) -> f64 {
    let upper = symbol.to_uppercase();
    if upper.contains("BTC") {
        96_000.0
    } else if upper.contains("ETH") {
        3_400.0
    } else if upper.contains("XAU") {
        2_400.0
    } else if upper.contains("JPY") {
        150.0
    } else if upper.contains("USD") {
        1.10
    } else {
        100.0
    }
}

fn window_seed(symbol: &str, open_time: i64) -> u64 {
    // FNV-1a over the symbol, mixed with the window start
    let mut hash = 0xcbf29ce484222325u64;
    for byte in symbol.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash ^ (open_time as u64)
}

/// Next LCG state and a unit value in [-0.5, 0.5)
fn lcg_step(seed: u64) -> (u64, f64) {
    let next = seed.wrapping_mul(1103515245).wrapping_add(12345);
    let unit = ((next / 65536) % 1000) as f64 / 1000.0 - 0.5;
    (next, unit)
}

/// Anchor price at a window boundary, within ±2% of the symbol base.
/// One window's close equals the next window's open by construction.
fn price_at(symbol: &str, open_time: i64) -> f64 {
    let (_, unit) = lcg_step(window_seed(symbol, open_time));
    base_price(symbol) * (1.0 + unit * 0.04)
}

fn synthesize_candle(symbol: &str, timeframe: Timeframe, open_time: i64) -> Candle {
    let step = timeframe.to_millis();
    let open = price_at(symbol, open_time);
    let close = price_at(symbol, open_time + step);

    let seed = window_seed(symbol, open_time);
    let (seed, wick_high) = lcg_step(seed.rotate_left(17));
    let (seed, wick_low) = lcg_step(seed);
    let high = open.max(close) * (1.0 + (wick_high + 0.5) * 0.004);
    let low = open.min(close) * (1.0 - (wick_low + 0.5) * 0.004);

    let to_dec = |value: f64| Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(6);

    Candle {
        symbol: symbol.to_string(),
        open_time,
        open: to_dec(open),
        high: to_dec(high),
        low: to_dec(low),
        close: to_dec(close),
        volume: Decimal::from(100 + seed % 900),
    }
}

#[async_trait]
impl MarketDataSource for SimulatedMarketData {
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataSourceError> {
        if self.take_failure() {
            return Err(DataSourceError::Network {
                reason: "injected outage".to_string(),
            });
        }

        let step = timeframe.to_millis();
        // Newest candle is the last fully closed window
        let latest_open = timeframe.period_start(Utc::now().timestamp_millis()) - step;

        let candles = (0..count as i64)
            .map(|i| {
                let open_time = latest_open - (count as i64 - 1 - i) * step;
                synthesize_candle(symbol, timeframe, open_time)
            })
            .collect();
        Ok(candles)
    }

    async fn subscribe_ticks(&self, symbol: &str) -> Result<Receiver<Tick>, DataSourceError> {
        if self.take_failure() {
            return Err(DataSourceError::Network {
                reason: "injected outage".to_string(),
            });
        }

        let (tx, rx) = mpsc::channel(100);
        let symbol = symbol.to_string();
        let tick_interval = self.tick_interval;
        let time_step_ms = self.time_step.as_millis() as i64;

        tokio::spawn(async move {
            info!("SimulatedMarketData: starting tick stream for {}", symbol);

            let mut now = Utc::now().timestamp_millis();
            let mut price = base_price(&symbol);
            let mut interval = time::interval(tick_interval);

            loop {
                interval.tick().await;

                // ThreadRng is not Send, so it never lives across an await
                let change_pct = {
                    use rand::Rng;
                    let mut rng = rand::rng();
                    rng.random_range(-0.002..0.002)
                };
                price *= 1.0 + change_pct;
                now += time_step_ms;

                let tick = Tick {
                    timestamp: now,
                    price: Decimal::from_f64(price).unwrap_or(Decimal::ZERO).round_dp(6),
                };
                if tx.send(tick).await.is_err() {
                    info!("SimulatedMarketData: tick stream for {} closed", symbol);
                    break;
                }
            }
        });

        Ok(rx)
    }
}
