use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval used for series retention and tick aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    OneHour,
    FourHour,
    OneDay,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::OneMin => 1,
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::ThirtyMin => 30,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
            Timeframe::OneDay => 1440,
        }
    }

    /// Returns the duration in seconds
    pub fn to_seconds(&self) -> i64 {
        (self.to_minutes() * 60) as i64
    }

    /// Returns the duration in milliseconds
    pub fn to_millis(&self) -> i64 {
        self.to_seconds() * 1000
    }

    /// Short interval notation used in logs and the signal log
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMin => "1m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::ThirtyMin => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    /// Returns the start timestamp of the period containing the given timestamp
    ///
    /// # Arguments
    /// * `timestamp_ms` - Unix timestamp in milliseconds
    ///
    /// # Returns
    /// The start timestamp (in ms) of the period containing this timestamp
    pub fn period_start(&self, timestamp_ms: i64) -> i64 {
        let timestamp_sec = timestamp_ms / 1000;
        let period_sec = self.to_seconds();

        // Round down to the nearest period boundary (midnight UTC for 1d)
        (timestamp_sec - (timestamp_sec % period_sec)) * 1000
    }
}

impl FromStr for Timeframe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "m1" | "1min" => Ok(Timeframe::OneMin),
            "5m" | "m5" | "5min" => Ok(Timeframe::FiveMin),
            "15m" | "m15" | "15min" => Ok(Timeframe::FifteenMin),
            "30m" | "m30" | "30min" => Ok(Timeframe::ThirtyMin),
            "1h" | "h1" | "1hour" => Ok(Timeframe::OneHour),
            "4h" | "h4" | "4hour" => Ok(Timeframe::FourHour),
            "1d" | "d1" | "1day" => Ok(Timeframe::OneDay),
            _ => Err(ConfigError::InvalidTimeframe { value: s.to_string() }),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(Timeframe::OneMin.to_minutes(), 1);
        assert_eq!(Timeframe::FiveMin.to_minutes(), 5);
        assert_eq!(Timeframe::FifteenMin.to_minutes(), 15);
        assert_eq!(Timeframe::ThirtyMin.to_minutes(), 30);
        assert_eq!(Timeframe::OneHour.to_minutes(), 60);
        assert_eq!(Timeframe::FourHour.to_minutes(), 240);
        assert_eq!(Timeframe::OneDay.to_minutes(), 1440);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::OneMin);
        assert_eq!(Timeframe::from_str("M30").unwrap(), Timeframe::ThirtyMin);
        assert_eq!(Timeframe::from_str("15min").unwrap(), Timeframe::FifteenMin);
        assert_eq!(Timeframe::from_str("1h").unwrap(), Timeframe::OneHour);
        assert_eq!(Timeframe::from_str("H4").unwrap(), Timeframe::FourHour);
        assert_eq!(Timeframe::from_str("1d").unwrap(), Timeframe::OneDay);
        assert!(Timeframe::from_str("invalid").is_err());
    }

    #[test]
    fn test_period_start() {
        // Test 5-minute alignment
        let tf = Timeframe::FiveMin;
        // 2024-01-01 00:00:00 UTC = 1704067200000 ms
        let base = 1704067200000i64;

        // 00:00:00 should align to 00:00:00
        assert_eq!(tf.period_start(base), base);

        // 00:03:00 should align to 00:00:00
        assert_eq!(tf.period_start(base + 3 * 60 * 1000), base);

        // 00:05:00 should align to 00:05:00
        assert_eq!(tf.period_start(base + 5 * 60 * 1000), base + 5 * 60 * 1000);

        // 00:07:30 should align to 00:05:00
        assert_eq!(tf.period_start(base + 7 * 60 * 1000 + 30_000), base + 5 * 60 * 1000);
    }

    #[test]
    fn test_period_start_daily() {
        let tf = Timeframe::OneDay;
        let midnight = 1704067200000i64; // 2024-01-01 00:00:00 UTC

        // Mid-afternoon rounds down to midnight
        assert_eq!(tf.period_start(midnight + 15 * 3600 * 1000), midnight);
        assert_eq!(tf.period_start(midnight), midnight);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for tf in [
            Timeframe::OneMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::ThirtyMin,
            Timeframe::OneHour,
            Timeframe::FourHour,
            Timeframe::OneDay,
        ] {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
    }
}
