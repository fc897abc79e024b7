use tracing_subscriber::{EnvFilter, fmt};

/// `verbose` forces `log_level` over `RUST_LOG`.
pub fn init_tracing(log_level: &str, verbose: bool) {
    // stdout is reserved for the namespace prompt.
    let _ = fmt()
        .with_env_filter(build_filter(log_level, verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_filter(log_level: &str, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(log_level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}
