use crate::domain::errors::ConfigError;
use crate::domain::market::timeframe::Timeframe;
use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction recommended by an evaluation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Major forex session active at a given UTC time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradingSession {
    Asian,
    London,
    NewYork,
}

impl TradingSession {
    /// Session bucket by UTC hour: [0, 8) Asian, [8, 16) London, rest New York
    pub fn at(time: DateTime<Utc>) -> Self {
        match time.hour() {
            0..=7 => TradingSession::Asian,
            8..=15 => TradingSession::London,
            _ => TradingSession::NewYork,
        }
    }
}

impl fmt::Display for TradingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingSession::Asian => write!(f, "Asian"),
            TradingSession::London => write!(f, "London"),
            TradingSession::NewYork => write!(f, "New York"),
        }
    }
}

/// Decision policy applied by the signal evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyPolicy {
    /// RSI extremes gated by the 0.618 retracement and support/resistance
    FibRsi,
    /// FibRsi plus a sweep check against the third-highest/third-lowest wick
    LiquidityGrab,
    /// Close crossing the 0.5 retracement, RSI picks the side
    StructureShift,
    /// RSI extremes alone with fixed pip offsets
    RsiPips,
}

impl FromStr for StrategyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fib_rsi" | "fibrsi" => Ok(StrategyPolicy::FibRsi),
            "liquidity_grab" | "liquiditygrab" => Ok(StrategyPolicy::LiquidityGrab),
            "structure_shift" | "structureshift" => Ok(StrategyPolicy::StructureShift),
            "rsi_pips" | "rsipips" => Ok(StrategyPolicy::RsiPips),
            _ => Err(ConfigError::InvalidStrategy { value: s.to_string() }),
        }
    }
}

impl fmt::Display for StrategyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyPolicy::FibRsi => write!(f, "fib_rsi"),
            StrategyPolicy::LiquidityGrab => write!(f, "liquidity_grab"),
            StrategyPolicy::StructureShift => write!(f, "structure_shift"),
            StrategyPolicy::RsiPips => write!(f, "rsi_pips"),
        }
    }
}

/// Outcome of one evaluation cycle for a symbol and timeframe.
///
/// Prices are rounded to the owning unit's display precision, RSI to 2
/// decimal places. Entry, stop and target are only present for Buy/Sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub direction: Direction,
    /// Price the cycle was evaluated at
    pub price: Decimal,
    pub entry: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub support: Option<Decimal>,
    pub resistance: Option<Decimal>,
    pub session: TradingSession,
    pub generated_at: DateTime<Utc>,
    /// Set when a degraded unit republishes its last known signal
    pub stale: bool,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        matches!(self.direction, Direction::Buy | Direction::Sell)
    }

    /// Copy of this signal marked stale, republished while the producing
    /// unit cannot reach its data source
    pub fn as_stale(&self) -> Signal {
        let mut copy = self.clone();
        copy.stale = true;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_boundaries() {
        let at = |hour| Utc.with_ymd_and_hms(2024, 3, 4, hour, 30, 0).unwrap();

        assert_eq!(TradingSession::at(at(0)), TradingSession::Asian);
        assert_eq!(TradingSession::at(at(7)), TradingSession::Asian);
        assert_eq!(TradingSession::at(at(8)), TradingSession::London);
        assert_eq!(TradingSession::at(at(15)), TradingSession::London);
        assert_eq!(TradingSession::at(at(16)), TradingSession::NewYork);
        assert_eq!(TradingSession::at(at(23)), TradingSession::NewYork);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Buy.to_string(), "BUY");
        assert_eq!(Direction::Sell.to_string(), "SELL");
        assert_eq!(Direction::Hold.to_string(), "HOLD");
    }

    #[test]
    fn test_strategy_policy_from_str() {
        assert_eq!("fib_rsi".parse::<StrategyPolicy>().unwrap(), StrategyPolicy::FibRsi);
        assert_eq!("LIQUIDITY_GRAB".parse::<StrategyPolicy>().unwrap(), StrategyPolicy::LiquidityGrab);
        assert_eq!("structureshift".parse::<StrategyPolicy>().unwrap(), StrategyPolicy::StructureShift);
        assert_eq!("rsi_pips".parse::<StrategyPolicy>().unwrap(), StrategyPolicy::RsiPips);
        assert!("martingale".parse::<StrategyPolicy>().is_err());
    }

    #[test]
    fn test_as_stale_only_flips_the_flag() {
        let signal = Signal {
            symbol: "frxXAUUSD".to_string(),
            timeframe: Timeframe::OneHour,
            direction: Direction::Buy,
            price: Decimal::from(2400),
            entry: Some(Decimal::from(2400)),
            stop_loss: Some(Decimal::from(2390)),
            take_profit: Some(Decimal::from(2420)),
            rsi: Some(Decimal::from(28)),
            support: Some(Decimal::from(2380)),
            resistance: Some(Decimal::from(2450)),
            session: TradingSession::London,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            stale: false,
        };

        let stale = signal.as_stale();
        assert!(stale.stale);
        assert_eq!(stale.direction, signal.direction);
        assert_eq!(stale.generated_at, signal.generated_at);
    }
}
