//! Diagnostic logging setup.
//!
//! Command output goes to stdout; diagnostics go to stderr so the CLI stays
//! pipeable. Default level is `warn`; set `TROLLEY_LOG` (an `EnvFilter`
//! directive, e.g. `trolley=debug`) for more.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("TROLLEY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}
