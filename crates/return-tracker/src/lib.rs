pub mod config;
pub mod error;
pub mod lookup;
pub mod queue;
pub mod snapshot;
pub mod telemetry;
