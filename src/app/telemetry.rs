//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for reports and plots. The filter
//! comes from `RUST_LOG` and defaults to `warn`.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once per process. Later calls are no-ops.
pub fn init_tracing() {
    INITIALISED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed by an embedding process.
        let _ = Registry::default().with(filter).with(fmt_layer).try_init();
    });
}
