use crate::domain::market::types::Candle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RATIO_236: Decimal = dec!(0.236);
const RATIO_382: Decimal = dec!(0.382);
const RATIO_500: Decimal = dec!(0.5);
const RATIO_618: Decimal = dec!(0.618);
const RATIO_786: Decimal = dec!(0.786);

/// Fibonacci retracement levels from the range high down to the range low.
///
/// Each level is `high - ratio * (high - low)`, so prices descend as the
/// ratio grows.
#[derive(Debug, Clone, PartialEq)]
pub struct FibLevels {
    pub r236: Decimal,
    pub r382: Decimal,
    pub r500: Decimal,
    pub r618: Decimal,
    pub r786: Decimal,
}

/// Retracement levels over the full series range, `None` for an empty series
pub fn fibonacci_levels(candles: &[Candle]) -> Option<FibLevels> {
    let high = candles.iter().map(|c| c.high).max()?;
    let low = candles.iter().map(|c| c.low).min()?;
    let range = high - low;

    Some(FibLevels {
        r236: high - RATIO_236 * range,
        r382: high - RATIO_382 * range,
        r500: high - RATIO_500 * range,
        r618: high - RATIO_618 * range,
        r786: high - RATIO_786 * range,
    })
}

/// Support and resistance as the lowest low and highest high.
///
/// When `window` is set only the newest `window` candles are considered.
/// Returns `(support, resistance)`, `None` for an empty series.
pub fn support_resistance(candles: &[Candle], window: Option<usize>) -> Option<(Decimal, Decimal)> {
    let slice = match window {
        Some(n) if n > 0 => &candles[candles.len().saturating_sub(n)..],
        _ => candles,
    };

    let support = slice.iter().map(|c| c.low).min()?;
    let resistance = slice.iter().map(|c| c.high).max()?;
    Some((support, resistance))
}

/// Whether the last two closes crossed the 0.5 retracement in either
/// direction. Closes sitting exactly on the level do not count as a cross.
pub fn structural_shift(candles: &[Candle], fib: &FibLevels) -> bool {
    let len = candles.len();
    if len < 2 {
        return false;
    }

    let prev = candles[len - 2].close;
    let last = candles[len - 1].close;
    let mid = fib.r500;

    (prev < mid && last > mid) || (prev > mid && last < mid)
}

/// Liquidity pools above and below price: the third-highest high and the
/// third-lowest low of the series. Returns `(high_liquidity, low_liquidity)`,
/// `None` until at least 3 candles exist.
pub fn liquidity_levels(candles: &[Candle]) -> Option<(Decimal, Decimal)> {
    if candles.len() < 3 {
        return None;
    }

    let mut highs: Vec<Decimal> = candles.iter().map(|c| c.high).collect();
    let mut lows: Vec<Decimal> = candles.iter().map(|c| c.low).collect();
    highs.sort_unstable();
    lows.sort_unstable();

    let high_liquidity = highs[highs.len() - 3];
    let low_liquidity = lows[2];
    Some((high_liquidity, low_liquidity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_candle(open_time: i64, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle {
            symbol: "frxXAUUSD".to_string(),
            open_time,
            open: close,
            high,
            low,
            close,
            volume: dec!(1),
        }
    }

    fn range_series() -> Vec<Candle> {
        // Range spans 100..200
        vec![
            make_candle(0, dec!(150), dec!(100), dec!(120)),
            make_candle(60_000, dec!(200), dec!(140), dec!(180)),
            make_candle(120_000, dec!(190), dec!(150), dec!(160)),
        ]
    }

    #[test]
    fn test_fibonacci_levels_from_range() {
        let fib = fibonacci_levels(&range_series()).unwrap();
        assert_eq!(fib.r236, dec!(176.4));
        assert_eq!(fib.r382, dec!(161.8));
        assert_eq!(fib.r500, dec!(150.0));
        assert_eq!(fib.r618, dec!(138.2));
        assert_eq!(fib.r786, dec!(121.4));
    }

    #[test]
    fn test_fibonacci_levels_descend_with_ratio() {
        let fib = fibonacci_levels(&range_series()).unwrap();
        assert!(fib.r236 > fib.r382);
        assert!(fib.r382 > fib.r500);
        assert!(fib.r500 > fib.r618);
        assert!(fib.r618 > fib.r786);
    }

    #[test]
    fn test_fibonacci_levels_empty_series() {
        assert!(fibonacci_levels(&[]).is_none());
    }

    #[test]
    fn test_support_resistance_full_series() {
        let (support, resistance) = support_resistance(&range_series(), None).unwrap();
        assert_eq!(support, dec!(100));
        assert_eq!(resistance, dec!(200));
    }

    #[test]
    fn test_support_resistance_windowed() {
        // Only the newest 2 candles: lows 140/150, highs 200/190
        let (support, resistance) = support_resistance(&range_series(), Some(2)).unwrap();
        assert_eq!(support, dec!(140));
        assert_eq!(resistance, dec!(200));

        // Window larger than the series falls back to the full range
        let (support, _) = support_resistance(&range_series(), Some(50)).unwrap();
        assert_eq!(support, dec!(100));
    }

    #[test]
    fn test_structural_shift_detects_crosses() {
        let fib = FibLevels {
            r236: dec!(176.4),
            r382: dec!(161.8),
            r500: dec!(150),
            r618: dec!(138.2),
            r786: dec!(121.4),
        };

        let upward = vec![
            make_candle(0, dec!(150), dec!(100), dec!(140)),
            make_candle(60_000, dec!(200), dec!(140), dec!(155)),
        ];
        assert!(structural_shift(&upward, &fib));

        let downward = vec![
            make_candle(0, dec!(200), dec!(140), dec!(155)),
            make_candle(60_000, dec!(160), dec!(100), dec!(140)),
        ];
        assert!(structural_shift(&downward, &fib));

        let no_cross = vec![
            make_candle(0, dec!(200), dec!(140), dec!(155)),
            make_candle(60_000, dec!(200), dec!(140), dec!(158)),
        ];
        assert!(!structural_shift(&no_cross, &fib));

        // Touching the level exactly is not a cross
        let touch = vec![
            make_candle(0, dec!(200), dec!(140), dec!(150)),
            make_candle(60_000, dec!(200), dec!(140), dec!(155)),
        ];
        assert!(!structural_shift(&touch, &fib));

        assert!(!structural_shift(&upward[..1], &fib));
    }

    #[test]
    fn test_liquidity_levels_third_extremes() {
        let candles = vec![
            make_candle(0, dec!(110), dec!(90), dec!(100)),
            make_candle(60_000, dec!(120), dec!(80), dec!(100)),
            make_candle(120_000, dec!(130), dec!(70), dec!(100)),
            make_candle(180_000, dec!(140), dec!(60), dec!(100)),
        ];

        let (high_liq, low_liq) = liquidity_levels(&candles).unwrap();
        // Third-highest of {140, 130, 120, 110} and third-lowest of {60, 70, 80, 90}
        assert_eq!(high_liq, dec!(120));
        assert_eq!(low_liq, dec!(80));
    }

    #[test]
    fn test_liquidity_levels_need_three_candles() {
        let candles = range_series();
        assert!(liquidity_levels(&candles[..2]).is_none());
        assert!(liquidity_levels(&candles).is_some());
    }
}
