//! Diagnostic logging setup.
//!
//! Stdout belongs exclusively to the machine-readable report, so the
//! subscriber always writes to stderr. Verbosity follows `RUST_LOG` unless
//! the `debug` option (config or `--debug` flag) forces debug level for the
//! runner's own targets.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::new("warn,crucible=debug,crucible_runner=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
