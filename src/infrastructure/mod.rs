pub mod signal_hub;
pub mod sim;
pub mod sinks;

pub use signal_hub::SignalHub;
