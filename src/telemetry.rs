//! Logging setup for binaries built on this crate

use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Calling it a second time leaves the first subscriber in place.
pub fn init_tracing_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
