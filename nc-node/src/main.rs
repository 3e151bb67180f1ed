#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod api;
mod args;
mod builder;
mod connection;
mod dialer;
mod error;
mod logging;
mod peer_handler;
mod server;
mod socket_metadata;
mod state;
#[cfg(test)]
mod test_node;
mod ws;

use args::Args;
use axum::Router;
use builder::ServerBuilder;
use clap::Parser;
pub use error::Error;
use nc_core::Blockchain;
use state::AppState;
use std::sync::Arc;
use tracing::{info, warn};

async fn run(args: Args) -> Result<(), Error> {
    let state = Arc::new(AppState::new(Blockchain::new(args.chain_params())));

    for url in &args.peers {
        if let Err(e) = dialer::connect(&state, url).await {
            warn!("Could not connect to initial peer {url}: {e}");
        }
    }

    info!("Building server on {}", args.http_addr);
    let server = ServerBuilder::new(args.http_addr)
        .mutate_router(|router| {
            let router: Router<()> = api::routes(router).with_state(state);
            router
        })
        .build();

    server.serve().await
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() {
    logging::setup_logging();
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error running node: {e}");
        std::process::exit(1);
    }
}
