// Signal evaluation policies
pub mod evaluator;

// Technical indicator computation
pub mod indicators;

// Market data processing
pub mod market_data;

// Work unit orchestration
pub mod scheduler;
