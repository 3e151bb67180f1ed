use serde::Serialize;
use std::future::Future;
use tracing::debug;
use url::Url;

use crate::error::Error;

const PEERS_PATH: &str = "/peers";
const JOIN_NETWORK_PATH: &str = "/joinNetwork";

/// Body of `POST /joinNetwork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequest<'a> {
    pub url: &'a str,
}

/// The two calls the join page makes against a node.
pub trait PeerNetwork: Send + Sync {
    /// `GET /peers`
    fn peers(&self) -> impl Future<Output = Result<Vec<String>, Error>> + Send;

    /// `POST /joinNetwork` with `{"url": url}`; the response body is ignored.
    fn join_network(&self, url: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

/// HTTP client for a node's peer API.
#[derive(Debug, Clone)]
pub struct PeerNetworkClient {
    base: Url,
    http: reqwest::Client,
}

impl PeerNetworkClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    pub fn parse(base: &str) -> Result<Self, Error> {
        Ok(Self::new(Url::parse(base)?))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base.join(path)?)
    }
}

impl PeerNetwork for PeerNetworkClient {
    async fn peers(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoint(PEERS_PATH)?;
        debug!("GET {url}");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                endpoint: PEERS_PATH,
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }

    async fn join_network(&self, url: &str) -> Result<(), Error> {
        let endpoint = self.endpoint(JOIN_NETWORK_PATH)?;
        debug!("POST {endpoint} url={url}");

        let response = self
            .http
            .post(endpoint)
            .json(&JoinRequest { url })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                endpoint: JOIN_NETWORK_PATH,
                status: response.status(),
            });
        }
        Ok(())
    }
}
