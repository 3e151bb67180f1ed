use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nc_node=debug,nc_core=info,tower_http=debug".into()),
        )
        .with(
            fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}
