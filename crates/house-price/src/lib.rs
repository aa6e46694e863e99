pub mod config;
pub mod error;
pub mod prediction;
pub mod property;
pub mod telemetry;
