#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use clap::Parser;
use nc_client::{JoinNetworkView, PeerNetwork, PeerNetworkClient};
use std::process::ExitCode;
use tracing::{error, info};

use crate::args::{Args, Command};

mod args;
mod logging;

async fn run(
    network: &impl PeerNetwork,
    command: Command,
) -> Result<JoinNetworkView, nc_client::Error> {
    let mut view = JoinNetworkView::new();
    if let Command::Join { url } = command {
        view.on_input(url);
        view.submit(network).await?;
        info!("Join request accepted");
    }
    view.mount(network).await?;
    Ok(view)
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> ExitCode {
    logging::setup_logging();
    let args = Args::parse();
    let client = PeerNetworkClient::new(args.node_url);
    info!("Using node {}", client.base());

    match run(&client, args.command).await {
        Ok(view) => {
            print!("{view}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
