mod config;
mod context;
mod docs;
mod errors;
mod events;
mod hub;
mod rooms;
mod schemas;
mod serialized;
mod socket;
mod sse;

use std::{
    io,
    net::{Ipv6Addr, SocketAddr},
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use config::*;
pub use context::ServerContext;
pub use errors::{ServerError, ServerResult};
pub use events::ServerEvent;

pub type Router = axum::Router<ServerContext>;

/// Builds the router with every endpoint of the server
pub fn app(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let room_router = rooms::router().merge(sse::router()).merge(socket::router());

    Router::new()
        .nest("/v1/rooms", room_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context)
}

/// Starts the vibefm server
pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, config.port).into();
    let context = ServerContext::new(config.collab);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on port {}", config.port);

    axum::serve(listener, app(context)).await
}
