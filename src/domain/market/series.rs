use super::types::Candle;

/// Bounded in-memory history for one symbol and timeframe.
///
/// Candles are held oldest to newest with strictly increasing `open_time`.
/// Appending past the retention limit evicts from the front.
#[derive(Debug)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    retention: usize,
}

impl CandleSeries {
    pub fn new(retention: usize) -> Self {
        Self {
            candles: Vec::with_capacity(retention),
            retention,
        }
    }

    /// Appends a closed candle.
    ///
    /// Returns `false` and leaves the series unchanged when the candle does
    /// not advance `open_time` past the newest held candle.
    pub fn push(&mut self, candle: Candle) -> bool {
        if let Some(last) = self.candles.last()
            && candle.open_time <= last.open_time
        {
            return false;
        }
        self.candles.push(candle);
        if self.candles.len() > self.retention {
            let excess = self.candles.len() - self.retention;
            self.candles.drain(..excess);
        }
        true
    }

    /// Replaces the whole history with a freshly fetched batch, keeping at
    /// most the newest `retention` candles. The caller is responsible for
    /// validating the batch ordering first.
    pub fn replace(&mut self, mut candles: Vec<Candle>) {
        if candles.len() > self.retention {
            let excess = candles.len() - self.retention;
            candles.drain(..excess);
        }
        self.candles = candles;
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}
