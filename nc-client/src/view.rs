use std::fmt;
use tracing::{debug, warn};

use crate::{client::PeerNetwork, error::Error};

/// State behind the "join network" page: the peer list shown to the user
/// and the peer URL currently typed into the form.
///
/// The peer list is only fetched by [`mount`](Self::mount); a successful
/// [`submit`](Self::submit) does not refresh it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JoinNetworkView {
    urls: Vec<String>,
    url: String,
}

impl JoinNetworkView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `/peers` once and keeps the answer verbatim, in server order.
    /// On error the previous list is left untouched.
    pub async fn mount(&mut self, network: &impl PeerNetwork) -> Result<(), Error> {
        let urls = network.peers().await?;
        debug!("Fetched {} peers", urls.len());
        self.urls = urls;
        Ok(())
    }

    pub fn on_input(&mut self, text: impl Into<String>) {
        self.url = text.into();
    }

    /// Current form input.
    pub fn input(&self) -> &str {
        &self.url
    }

    /// Requests a join with the current input. The input is cleared whatever
    /// the outcome.
    pub async fn submit(&mut self, network: &impl PeerNetwork) -> Result<(), Error> {
        let url = std::mem::take(&mut self.url);
        let result = network.join_network(&url).await;
        if let Err(e) = &result {
            warn!("Join request for {url} failed: {e}");
        }
        result
    }

    /// Peer entries to render, in order.
    pub fn entries(&self) -> &[String] {
        &self.urls
    }
}

impl fmt::Display for JoinNetworkView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for url in &self.urls {
            writeln!(f, "{url}")?;
        }
        Ok(())
    }
}
