// Signal evaluation over an indicator snapshot
use crate::application::indicators::IndicatorSnapshot;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::signal::{Direction, Signal, StrategyPolicy, TradingSession};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RSI_OVERSOLD: Decimal = dec!(30);
const RSI_OVERBOUGHT: Decimal = dec!(70);
/// Risk per structure-shift entry as a fraction of price
const SHIFT_RISK_FRACTION: Decimal = dec!(0.01);
const HALF: Decimal = dec!(0.5);

struct Decision {
    direction: Direction,
    entry: Decimal,
    stop_loss: Decimal,
    take_profit: Decimal,
}

/// Applies one strategy policy to indicator snapshots.
///
/// Every evaluation yields a Signal; when any required indicator is missing
/// or no entry condition holds, the direction is Hold. Retracement entries
/// keep a 2:1 reward-to-risk by placing the stop at half the target
/// distance on the far side of the entry.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    policy: StrategyPolicy,
    pip_stop: Decimal,
    pip_target: Decimal,
}

impl SignalEvaluator {
    pub fn new(policy: StrategyPolicy, pip_stop: Decimal, pip_target: Decimal) -> Self {
        Self {
            policy,
            pip_stop,
            pip_target,
        }
    }

    pub fn policy(&self) -> StrategyPolicy {
        self.policy
    }

    /// Evaluates one cycle at the given price. Prices on the resulting
    /// signal are rounded to `precision` decimal places, RSI to 2.
    pub fn evaluate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        precision: u32,
        price: Decimal,
        snapshot: &IndicatorSnapshot,
    ) -> Signal {
        let now = Utc::now();

        let (direction, entry, stop_loss, take_profit) = match self.decide(price, snapshot) {
            Some(decision) => (
                decision.direction,
                Some(decision.entry.round_dp(precision)),
                Some(decision.stop_loss.round_dp(precision)),
                Some(decision.take_profit.round_dp(precision)),
            ),
            None => (Direction::Hold, None, None, None),
        };

        Signal {
            symbol: symbol.to_string(),
            timeframe,
            direction,
            price: price.round_dp(precision),
            entry,
            stop_loss,
            take_profit,
            rsi: snapshot.rsi.map(|rsi| rsi.round_dp(2)),
            support: snapshot.support.map(|s| s.round_dp(precision)),
            resistance: snapshot.resistance.map(|r| r.round_dp(precision)),
            session: TradingSession::at(now),
            generated_at: now,
            stale: false,
        }
    }

    fn decide(&self, price: Decimal, snapshot: &IndicatorSnapshot) -> Option<Decision> {
        let rsi = snapshot.rsi?;

        match self.policy {
            StrategyPolicy::FibRsi => self.retracement_entry(price, rsi, snapshot, None),
            StrategyPolicy::LiquidityGrab => {
                let sweep = (snapshot.high_liquidity?, snapshot.low_liquidity?);
                self.retracement_entry(price, rsi, snapshot, Some(sweep))
            }
            StrategyPolicy::StructureShift => self.structure_shift_entry(price, rsi, snapshot),
            StrategyPolicy::RsiPips => self.pip_entry(price, rsi),
        }
    }

    /// FibRsi core: RSI extreme while price sits at the 0.618 retracement
    /// inside the support/resistance channel. LiquidityGrab adds the sweep
    /// gate, requiring price to stay on the near side of the liquidity pool.
    fn retracement_entry(
        &self,
        price: Decimal,
        rsi: Decimal,
        snapshot: &IndicatorSnapshot,
        sweep: Option<(Decimal, Decimal)>,
    ) -> Option<Decision> {
        let fib = snapshot.fib.as_ref()?;
        let support = snapshot.support?;
        let resistance = snapshot.resistance?;

        if rsi < RSI_OVERSOLD && price <= fib.r618 && price > support {
            if let Some((_, low_liquidity)) = sweep
                && price <= low_liquidity
            {
                return None;
            }
            let take_profit = fib.r382;
            let stop_loss = price - (take_profit - price) * HALF;
            return Some(Decision {
                direction: Direction::Buy,
                entry: price,
                stop_loss,
                take_profit,
            });
        }

        if rsi > RSI_OVERBOUGHT && price >= fib.r618 && price < resistance {
            if let Some((high_liquidity, _)) = sweep
                && price >= high_liquidity
            {
                return None;
            }
            let take_profit = fib.r786;
            let stop_loss = price + (price - take_profit) * HALF;
            return Some(Decision {
                direction: Direction::Sell,
                entry: price,
                stop_loss,
                take_profit,
            });
        }

        None
    }

    fn structure_shift_entry(
        &self,
        price: Decimal,
        rsi: Decimal,
        snapshot: &IndicatorSnapshot,
    ) -> Option<Decision> {
        if !snapshot.structural_shift {
            return None;
        }

        let risk = price * SHIFT_RISK_FRACTION;
        if rsi < RSI_OVERSOLD {
            return Some(Decision {
                direction: Direction::Buy,
                entry: price,
                stop_loss: price - risk,
                take_profit: price + risk * Decimal::TWO,
            });
        }
        if rsi > RSI_OVERBOUGHT {
            return Some(Decision {
                direction: Direction::Sell,
                entry: price,
                stop_loss: price + risk,
                take_profit: price - risk * Decimal::TWO,
            });
        }
        None
    }

    fn pip_entry(&self, price: Decimal, rsi: Decimal) -> Option<Decision> {
        if rsi < RSI_OVERSOLD {
            return Some(Decision {
                direction: Direction::Buy,
                entry: price,
                stop_loss: price - self.pip_stop,
                take_profit: price + self.pip_target,
            });
        }
        if rsi > RSI_OVERBOUGHT {
            return Some(Decision {
                direction: Direction::Sell,
                entry: price,
                stop_loss: price + self.pip_stop,
                take_profit: price - self.pip_target,
            });
        }
        None
    }
}
