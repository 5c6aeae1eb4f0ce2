use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "TABLERO_LOG";

/// Filter used when `TABLERO_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber for the `tb` binary. Safe to call more than once; later calls
/// leave the existing subscriber in place.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
