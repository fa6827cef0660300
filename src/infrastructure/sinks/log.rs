use crate::domain::ports::SignalSink;
use crate::domain::signal::{Direction, Signal};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Writes every signal to the structured log. Actionable signals log at
/// info, Hold outcomes at debug so the default filter stays quiet
/// between setups.
pub struct LogSink;

fn fmt_opt(value: &Option<Decimal>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl SignalSink for LogSink {
    fn publish(&self, signal: &Signal) {
        let stale_note = if signal.stale { " (stale)" } else { "" };

        match signal.direction {
            Direction::Buy | Direction::Sell => info!(
                "Signal [{} {}]: {} @ {} | entry {} sl {} tp {} | RSI {} | {} session{}",
                signal.symbol,
                signal.timeframe,
                signal.direction,
                signal.price,
                fmt_opt(&signal.entry),
                fmt_opt(&signal.stop_loss),
                fmt_opt(&signal.take_profit),
                fmt_opt(&signal.rsi),
                signal.session,
                stale_note
            ),
            Direction::Hold => debug!(
                "Signal [{} {}]: HOLD @ {} | RSI {}{}",
                signal.symbol,
                signal.timeframe,
                signal.price,
                fmt_opt(&signal.rsi),
                stale_note
            ),
        }
    }
}
