use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::server::Server;

pub struct ServerBuilder<S = ()> {
    addr: SocketAddr,
    router: Router<S>,
}

impl ServerBuilder<()> {
    /// Finishes the router with the default middleware. Layers only wrap
    /// routes that exist when they are added, so this happens last.
    pub fn build(self) -> Server {
        let builder = self.default_middleware();
        Server::new(
            builder.addr,
            builder
                .router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
    }
}

impl<S> ServerBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            router: Router::new(),
        }
    }

    pub fn mutate_router<R, T>(self, alter: R) -> ServerBuilder<T>
    where
        T: Clone + Send + Sync + 'static,
        R: FnOnce(Router<S>) -> Router<T>,
    {
        let router = alter(self.router);
        ServerBuilder {
            addr: self.addr,
            router,
        }
    }

    fn default_middleware(self) -> Self {
        self.logging_middleware().allow_any_cors()
    }

    fn logging_middleware(self) -> Self {
        self.mutate_router(|router| {
            let trace_layer = TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::new().level(Level::DEBUG));

            router.layer(trace_layer)
        })
    }

    /// The JoinNetwork page is served from another origin and posts JSON.
    fn allow_any_cors(self) -> Self {
        self.mutate_router(|router| {
            let cors_layer = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors_layer)
        })
    }
}
