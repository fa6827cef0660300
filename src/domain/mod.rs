// Market data domain
pub mod market;

// Port interfaces
pub mod ports;

// Signal vocabulary
pub mod signal;

// Domain-specific error types
pub mod errors;
