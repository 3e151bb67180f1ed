use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[clap(
    name = "nc-client",
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub(crate) struct Args {
    /// Base URL of the node's HTTP API
    #[clap(
        short = 'n',
        long = "node",
        default_value = "http://127.0.0.1:3001",
        env = "NODE_URL"
    )]
    pub(crate) node_url: Url,

    #[clap(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// List the node's peers
    Peers,
    /// Ask the node to connect to a peer, then list its peers
    Join {
        /// Peer websocket URL, e.g. `ws://127.0.0.1:3002/ws`
        url: String,
    },
}
