use axum::{Router, extract::connect_info::IntoMakeServiceWithConnectInfo};
use std::net::{SocketAddr, TcpListener};
use tracing::info;

use crate::error::Error;

pub struct Server {
    pub local_addr: Option<SocketAddr>,

    pub(crate) addr: SocketAddr,

    svc_info: IntoMakeServiceWithConnectInfo<Router, SocketAddr>,

    listener: Option<TcpListener>,
}

impl Server {
    pub(crate) fn new(
        addr: impl Into<SocketAddr>,
        svc_info: IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
    ) -> Self {
        Self {
            addr: addr.into(),
            svc_info,
            listener: None,
            local_addr: None,
        }
    }

    /// Binds the listener now, so callers can learn the port before serving.
    pub(crate) fn bind(&mut self) -> Result<SocketAddr, Error> {
        let listener = TcpListener::bind(self.addr).map_err(Error::Bind)?;
        listener.set_nonblocking(true).map_err(Error::Bind)?;
        let local_addr = listener.local_addr().map_err(Error::Bind)?;
        self.local_addr = Some(local_addr);
        self.listener = Some(listener);
        Ok(local_addr)
    }

    fn take_listener(&mut self) -> Result<TcpListener, Error> {
        if self.listener.is_none() {
            self.bind()?;
        }
        self.listener
            .take()
            .ok_or_else(|| Error::Bind(std::io::Error::other("listener not bound")))
    }

    /// Serve the server
    pub async fn serve(mut self) -> Result<(), Error> {
        let listener = tokio::net::TcpListener::from_std(self.take_listener()?).map_err(Error::Bind)?;

        if let Some(local_addr) = self.local_addr {
            info!("Server started on {local_addr}");
        }

        axum::serve(listener, self.svc_info)
            .await
            .map_err(Error::Serve)
    }
}
