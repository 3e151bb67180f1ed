use clap::Parser;
use nc_core::{BLOCK_GENERATION_INTERVAL, ChainParams, DIFFICULTY_ADJUSTMENT_INTERVAL};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[clap(
    name = "nc-node",
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub(crate) struct Args {
    /// Address the HTTP API and the `/ws` peer endpoint listen on
    #[clap(short = 'a', long, default_value = "0.0.0.0:3001", env)]
    pub(crate) http_addr: SocketAddr,

    /// Peer URLs (`ws://host:port/ws`) to connect to at startup
    #[clap(short = 'p', long, env, value_delimiter = ',')]
    pub(crate) peers: Vec<String>,

    /// Expected seconds between blocks
    #[clap(long, default_value_t = BLOCK_GENERATION_INTERVAL, env)]
    pub(crate) block_interval: i64,

    /// Blocks between difficulty adjustments
    #[clap(long, default_value_t = DIFFICULTY_ADJUSTMENT_INTERVAL, env)]
    pub(crate) adjustment_interval: u64,
}

impl Args {
    pub(crate) fn chain_params(&self) -> ChainParams {
        ChainParams {
            block_generation_interval: self.block_interval,
            difficulty_adjustment_interval: self.adjustment_interval,
        }
    }
}
