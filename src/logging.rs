//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `info` or
//! `cogserv=debug`) decides what is printed.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Builds the filter, falling back to `info` for an unparseable default
pub fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber; fails if one is already installed
pub fn init(default_filter: &str) -> Result<(), TryInitError> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(stdout_layer)
        .try_init()
}
