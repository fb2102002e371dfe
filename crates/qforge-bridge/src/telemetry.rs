//! Tracing setup for processes that host the simulator.

use qforge_core::SimConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build the level filter: `RUST_LOG` if set and valid, else `config.log_level`.
pub fn env_filter(config: &SimConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global `fmt` subscriber.
///
/// Safe to call more than once: only the first call installs anything.
/// Returns whether this call did.
pub fn init_tracing(config: &SimConfig) -> bool {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(config.multi_worker)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
