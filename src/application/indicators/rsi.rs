use crate::domain::market::types::Candle;
use rust_decimal::Decimal;

/// Relative Strength Index over the newest `period` close deltas, using a
/// simple average of gains and losses.
///
/// Returns `None` until the series holds at least `period + 1` candles.
/// When no losses occurred over the window the RSI saturates at 100.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - (period + 1)..];
    let mut gain_sum = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;

    for pair in window.windows(2) {
        let delta = pair[1].close - pair[0].close;
        if delta > Decimal::ZERO {
            gain_sum += delta;
        } else {
            loss_sum -= delta;
        }
    }

    let period = Decimal::from(period);
    let avg_gain = gain_sum / period;
    let avg_loss = loss_sum / period;

    if avg_loss.is_zero() {
        return Some(Decimal::ONE_HUNDRED);
    }

    let rs = avg_gain / avg_loss;
    Some(Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs))
}
