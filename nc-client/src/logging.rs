use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so stdout carries only the peer list.
pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "nc_client=info".into()))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
