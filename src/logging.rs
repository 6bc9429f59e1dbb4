//! Structured logging.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! status lines the demo prints. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "evm_transfer_demo=info";

/// Install the global subscriber. `verbose` raises the crate's level to debug.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "evm_transfer_demo=debug"
    } else {
        DEFAULT_FILTER
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
