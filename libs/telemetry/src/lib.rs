//! Tracing setup shared by Greentic transport tooling.
//!
//! Log output is plain text on stderr by default; set `LOG_FORMAT=json` for
//! flattened JSON events. `RUST_LOG` overrides the default `info` filter.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::TelemetryConfig;
pub use tracing_init::init_tracing;

/// Installs the tracing subscriber configured from the environment. Safe to call twice.
pub fn install(service_name: &str) -> Result<()> {
    init_tracing(&TelemetryConfig::from_env(service_name))
}
