// Indicator kernels over closed-candle series
pub mod levels;
pub mod rsi;

use crate::domain::market::types::Candle;
use levels::FibLevels;
use rust_decimal::Decimal;

/// Indicator parameters shared by every work unit
#[derive(Debug, Clone, Copy)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    /// Restrict support/resistance to the newest N candles when set
    pub sr_window: Option<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            sr_window: None,
        }
    }
}

/// Point-in-time view of every indicator over one series.
///
/// Fields are `None` whenever the series is too short for the indicator,
/// never an error. The evaluator degrades to Hold on missing inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: Option<Decimal>,
    pub fib: Option<FibLevels>,
    pub support: Option<Decimal>,
    pub resistance: Option<Decimal>,
    pub structural_shift: bool,
    pub high_liquidity: Option<Decimal>,
    pub low_liquidity: Option<Decimal>,
}

/// Computes every indicator over the series in one pass
pub fn compute_snapshot(candles: &[Candle], config: &IndicatorConfig) -> IndicatorSnapshot {
    let fib = levels::fibonacci_levels(candles);
    let (support, resistance) = match levels::support_resistance(candles, config.sr_window) {
        Some((s, r)) => (Some(s), Some(r)),
        None => (None, None),
    };
    let structural_shift = fib
        .as_ref()
        .is_some_and(|fib| levels::structural_shift(candles, fib));
    let (high_liquidity, low_liquidity) = match levels::liquidity_levels(candles) {
        Some((high, low)) => (Some(high), Some(low)),
        None => (None, None),
    };

    IndicatorSnapshot {
        rsi: rsi::calculate_rsi(candles, config.rsi_period),
        fib,
        support,
        resistance,
        structural_shift,
        high_liquidity,
        low_liquidity,
    }
}
