use crate::application::evaluator::SignalEvaluator;
use crate::application::indicators::{self, IndicatorConfig};
use crate::application::market_data::candle_aggregator::CandleAggregator;
use crate::application::scheduler::backoff::RetryState;
use crate::config::{AcquisitionMode, Config, RetryPolicy, WatchItem};
use crate::domain::errors::DataSourceError;
use crate::domain::market::series::CandleSeries;
use crate::domain::market::types::Candle;
use crate::domain::ports::MarketDataSource;
use crate::domain::signal::Signal;
use crate::infrastructure::signal_hub::SignalHub;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Evaluation settings shared by every work unit
#[derive(Clone)]
pub struct UnitSettings {
    pub evaluator: SignalEvaluator,
    pub indicators: IndicatorConfig,
    pub retry: RetryPolicy,
    pub poll_interval: Duration,
    pub stream_throttle: Duration,
}

impl UnitSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            evaluator: SignalEvaluator::new(config.strategy, config.pip_stop, config.pip_target),
            indicators: IndicatorConfig {
                rsi_period: config.rsi_period,
                sr_window: config.sr_window,
            },
            retry: config.retry,
            poll_interval: config.poll_interval,
            stream_throttle: config.stream_throttle,
        }
    }
}

/// Owns the full pipeline for one symbol and timeframe: data acquisition,
/// series retention, indicator evaluation and signal publication.
///
/// A unit never exits on data source errors. Failures back off per the
/// retry policy; once degraded the unit retries at the cap forever and
/// republishes its last known signal marked stale. Only the shutdown
/// broadcast ends the run loop.
pub struct WorkUnit {
    item: WatchItem,
    settings: UnitSettings,
    source: Arc<dyn MarketDataSource>,
    hub: SignalHub,
    series: CandleSeries,
    retry: RetryState,
    last_signal: Option<Signal>,
}

impl WorkUnit {
    pub fn new(
        item: WatchItem,
        settings: UnitSettings,
        source: Arc<dyn MarketDataSource>,
        hub: SignalHub,
    ) -> Self {
        let series = CandleSeries::new(item.retention);
        let retry = RetryState::new(settings.retry);
        Self {
            item,
            settings,
            source,
            hub,
            series,
            retry,
            last_signal: None,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "WorkUnit[{} {}]: started ({} mode)",
            self.item.symbol, self.item.timeframe, self.item.mode
        );

        match self.item.mode {
            AcquisitionMode::Poll => self.run_polling(&mut shutdown).await,
            AcquisitionMode::Stream => self.run_streaming(&mut shutdown).await,
        }

        info!("WorkUnit[{} {}]: stopped", self.item.symbol, self.item.timeframe);
    }

    async fn run_polling(&mut self, shutdown: &mut broadcast::Receiver<()>) {
        loop {
            // First fetch happens immediately; afterwards the loop sleeps
            // the poll interval, or the backoff delay after a failure
            let wait = match self.refresh_cycle().await {
                Ok(()) => self.settings.poll_interval,
                Err(error) => self.handle_failure(&error),
            };

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = sleep(wait) => {}
            }
        }
    }

    async fn run_streaming(&mut self, shutdown: &mut broadcast::Receiver<()>) {
        // Seed the series so indicators have history before the first tick
        loop {
            match self.refresh_cycle().await {
                Ok(()) => break,
                Err(error) => {
                    let wait = self.handle_failure(&error);
                    tokio::select! {
                        _ = shutdown.recv() => return,
                        _ = sleep(wait) => {}
                    }
                }
            }
        }

        let mut aggregator = CandleAggregator::new(self.item.symbol.clone(), self.item.timeframe);

        'resubscribe: loop {
            let mut ticks = match self.source.subscribe_ticks(&self.item.symbol).await {
                Ok(receiver) => receiver,
                Err(error) => {
                    let wait = self.handle_failure(&error);
                    tokio::select! {
                        _ = shutdown.recv() => return,
                        _ = sleep(wait) => {}
                    }
                    continue 'resubscribe;
                }
            };
            self.retry.reset();
            info!(
                "WorkUnit[{} {}]: tick stream connected",
                self.item.symbol, self.item.timeframe
            );

            // tokio interval panics on a zero period
            let throttle_period = self.settings.stream_throttle.max(Duration::from_millis(1));
            let mut throttle = tokio::time::interval(throttle_period);
            throttle.tick().await; // First tick completes immediately

            loop {
                tokio::select! {
                    _ = shutdown.recv() => return,
                    received = ticks.recv() => match received {
                        Some(tick) => {
                            if let Some(closed) = aggregator.ingest(&tick) {
                                let price = closed.close;
                                if !self.series.push(closed) {
                                    warn!(
                                        "WorkUnit[{} {}]: discarded non-advancing candle",
                                        self.item.symbol, self.item.timeframe
                                    );
                                }
                                self.evaluate_and_publish(price);
                                throttle.reset();
                            }
                        }
                        None => {
                            let error = DataSourceError::Network {
                                reason: "tick stream ended".to_string(),
                            };
                            let wait = self.handle_failure(&error);
                            tokio::select! {
                                _ = shutdown.recv() => return,
                                _ = sleep(wait) => {}
                            }
                            continue 'resubscribe;
                        }
                    },
                    _ = throttle.tick() => {
                        // Periodic re-evaluation between candle closes, at
                        // the latest price inside the open candle
                        if let Some(price) = aggregator.current_price() {
                            self.evaluate_and_publish(price);
                        }
                    }
                }
            }
        }
    }

    /// Replaces the series with a fresh history fetch and evaluates at the
    /// newest close
    async fn refresh_cycle(&mut self) -> Result<(), DataSourceError> {
        let candles = self
            .source
            .fetch_history(&self.item.symbol, self.item.timeframe, self.item.retention)
            .await?;
        let price = validate_history(&self.item.symbol, &candles)?;

        self.series.replace(candles);
        self.retry.reset();
        self.evaluate_and_publish(price);
        Ok(())
    }

    fn evaluate_and_publish(&mut self, price: Decimal) {
        let snapshot =
            indicators::compute_snapshot(self.series.as_slice(), &self.settings.indicators);
        let signal = self.settings.evaluator.evaluate(
            &self.item.symbol,
            self.item.timeframe,
            self.item.precision,
            price,
            &snapshot,
        );

        debug!(
            "WorkUnit[{} {}]: cycle evaluated → {} @ {}",
            self.item.symbol, self.item.timeframe, signal.direction, signal.price
        );

        self.last_signal = Some(signal.clone());
        self.hub.publish(signal);
    }

    /// Applies backoff accounting and returns the wait before the next try
    fn handle_failure(&mut self, error: &DataSourceError) -> Duration {
        let delay = self.retry.on_failure();

        if self.retry.just_degraded() {
            error!(
                "WorkUnit[{} {}]: degraded after {} consecutive failures: {}. Retrying every {:?}",
                self.item.symbol,
                self.item.timeframe,
                self.retry.failures(),
                error,
                delay
            );
        } else if self.retry.is_degraded() {
            warn!(
                "WorkUnit[{} {}]: still degraded (failure {}): {}",
                self.item.symbol,
                self.item.timeframe,
                self.retry.failures(),
                error
            );
        } else {
            warn!(
                "WorkUnit[{} {}]: data source call failed (attempt {}): {}. Backing off {:?}",
                self.item.symbol,
                self.item.timeframe,
                self.retry.failures(),
                error,
                delay
            );
        }

        if self.retry.is_degraded()
            && let Some(last) = &self.last_signal
        {
            self.hub.publish(last.as_stale());
        }

        delay
    }
}

/// Checks a fetched history batch: non-empty and strictly increasing
/// `open_time`. Returns the newest close on success.
fn validate_history(symbol: &str, candles: &[Candle]) -> Result<Decimal, DataSourceError> {
    let Some(last) = candles.last() else {
        return Err(DataSourceError::Malformed {
            symbol: symbol.to_string(),
            reason: "empty candle history".to_string(),
        });
    };

    for pair in candles.windows(2) {
        if pair[1].open_time <= pair[0].open_time {
            return Err(DataSourceError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("candle history out of order at {}", pair[1].open_time),
            });
        }
    }

    Ok(last.close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_candle(open_time: i64, close: Decimal) -> Candle {
        Candle {
            symbol: "frxEURUSD".to_string(),
            open_time,
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1),
        }
    }

    #[test]
    fn test_validate_history_returns_newest_close() {
        let candles = vec![
            make_candle(0, dec!(1.10)),
            make_candle(60_000, dec!(1.11)),
            make_candle(120_000, dec!(1.12)),
        ];
        assert_eq!(validate_history("frxEURUSD", &candles).unwrap(), dec!(1.12));
    }

    #[test]
    fn test_validate_history_rejects_empty_batches() {
        let err = validate_history("frxEURUSD", &[]).unwrap_err();
        assert!(matches!(err, DataSourceError::Malformed { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_history_rejects_unordered_batches() {
        let duplicated = vec![make_candle(60_000, dec!(1.10)), make_candle(60_000, dec!(1.11))];
        assert!(validate_history("frxEURUSD", &duplicated).is_err());

        let backwards = vec![make_candle(120_000, dec!(1.10)), make_candle(60_000, dec!(1.11))];
        assert!(validate_history("frxEURUSD", &backwards).is_err());
    }
}
