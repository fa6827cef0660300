// Signal sink implementations
pub mod csv_audit;
pub mod latest_cache;
pub mod log;
