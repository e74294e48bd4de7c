use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "nutrilab=info";

/// Installs the global subscriber, honouring `RUST_LOG`. Logs go to stderr so
/// JSON printed on stdout stays clean. Safe to call more than once.
pub fn init(verbose: bool) {
    let fallback = if verbose { "nutrilab=debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
