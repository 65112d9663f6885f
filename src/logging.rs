//! Tracing subscriber setup for hosts embedding the chat core.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "ralsei_chat=info";

/// Install a fmt subscriber filtered by `RUST_LOG` (default `ralsei_chat=info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
