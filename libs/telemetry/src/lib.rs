//! Logging and dispatch metrics for the ESP connector.
//!
//! Libraries only emit `tracing` events and `metrics` counters; binaries call
//! [`install`] once at startup.

use anyhow::Result;

mod config;
mod metrics;
mod tracing_init;

pub use config::TelemetryConfig;
pub use metrics::{DISPATCH_COUNTER, DispatchOutcome, record_dispatch};
pub use tracing_init::init_telemetry;

/// Installs the shared subscriber configured from `RUST_LOG` and `LOG_FORMAT`.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(service_name))
}
