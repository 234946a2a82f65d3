//! HTTP responder.
//!
//! # Responsibilities
//! - Create the Axum router answering every method on every path
//! - Force `Connection: close` so each request arrives on a fresh connection
//! - Report the connection's remote address as the client
//!
//! # Design Decisions
//! - The header is set by a tower-http layer, not by the handler, so it is
//!   present on every response the router produces
//! - Request concurrency is left to the HTTP engine (one task per connection)

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderValue},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::Protocol;
use crate::message::{self, ClientIdentity, ServerIdentity};
use crate::net::{socket, ConnectionTracker, ListenerError};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub server: ServerIdentity,
    pub tracker: ConnectionTracker,
}

/// HTTP server answering every request with one JSON line.
pub struct HttpResponder {
    listener: TcpListener,
    tracker: ConnectionTracker,
}

impl HttpResponder {
    /// Bind to `addr`.
    pub async fn bind(addr: SocketAddr, tracker: ConnectionTracker) -> Result<Self, ListenerError> {
        let listener = socket::tcp_listener(addr).map_err(ListenerError::bind(Protocol::Http, addr))?;

        Ok(Self { listener, tracker })
    }

    /// Get the local address this responder is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serve until the HTTP engine fails.
    pub async fn run(self, server: ServerIdentity) -> Result<(), ListenerError> {
        let port = self.local_addr().map(|addr| addr.port()).unwrap_or_default();
        tracing::info!(protocol = %Protocol::Http, port, "Serving");

        let state = AppState {
            server,
            tracker: self.tracker,
        };
        let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(self.listener, app)
            .await
            .map_err(ListenerError::Serve)
    }
}

/// Build the Axum router with its middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(report_handler))
        .route("/{*path}", any(report_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONNECTION,
                    HeaderValue::from_static("close"),
                )),
        )
}

async fn report_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> String {
    let guard = state.tracker.track();
    let client = ClientIdentity::from(peer);
    tracing::info!(connection_id = %guard.id(), client = %client, "HTTP request");

    message::format(&state.server, &client).to_line()
}
