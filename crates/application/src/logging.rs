//! Process-wide `tracing` setup for binaries embedding the coordinator.
//!
//! Library code only emits events; installing a subscriber is left to the
//! host through [`init_logging`].

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,inputshift=debug";

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("logging initialized");
    }
}
