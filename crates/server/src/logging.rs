//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,server=debug,pipeline=debug,store=debug,tower_http=debug";

/// Install the global fmt subscriber, honouring `RUST_LOG` when present.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
