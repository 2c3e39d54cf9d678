//! Tracing subscriber setup for the binary
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the executable so embedders keep control of their own output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter (e.g. `gastos=debug`)
pub const LOG_ENV: &str = "GASTOS_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from `GASTOS_LOG`, falling back to warnings only
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr fmt layer so log lines never mix with command output
///
/// Calling it twice is harmless; the second subscriber is simply not installed.
pub fn init() {
    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter())
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }
}
