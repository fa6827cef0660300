// Market data domain
pub mod series;
pub mod timeframe;
pub mod types;
