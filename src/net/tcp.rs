//! Raw TCP responder.
//!
//! # Responsibilities
//! - Bind the configured port
//! - Accept connections forever, one task per connection
//! - Write one response line, then close
//!
//! # Design Decisions
//! - A failing accept ends the loop with an error (no retry)
//! - Write errors are the client's problem and only reach debug logs

use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::config::Protocol;
use crate::message::{self, ClientIdentity, ServerIdentity};
use crate::net::connection::{ConnectionGuard, ConnectionTracker};
use crate::net::listener::ListenerError;
use crate::net::socket;

/// Answers every TCP connection with one JSON line.
pub struct TcpResponder {
    inner: TcpListener,
    tracker: ConnectionTracker,
}

impl TcpResponder {
    /// Bind to `addr`.
    pub async fn bind(addr: SocketAddr, tracker: ConnectionTracker) -> Result<Self, ListenerError> {
        let inner = socket::tcp_listener(addr).map_err(ListenerError::bind(Protocol::Tcp, addr))?;

        Ok(Self { inner, tracker })
    }

    /// Get the local address this responder is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept until accepting fails. Only returns with an error.
    pub async fn run(self, server: ServerIdentity) -> Result<(), ListenerError> {
        let port = self.local_addr().map(|addr| addr.port()).unwrap_or_default();
        tracing::info!(protocol = %Protocol::Tcp, port, "Serving");

        loop {
            let (stream, peer) = self.inner.accept().await.map_err(ListenerError::Accept)?;
            let guard = self.tracker.track();
            let server = server.clone();

            tokio::spawn(async move {
                respond(stream, peer, &server, guard).await;
            });
        }
    }
}

async fn respond(mut stream: TcpStream, peer: SocketAddr, server: &ServerIdentity, guard: ConnectionGuard) {
    let client = ClientIdentity::from(peer);
    tracing::info!(connection_id = %guard.id(), client = %client, "TCP request");

    let line = message::format(server, &client).to_line();
    if let Err(e) = stream.write_all(line.as_bytes()).await {
        tracing::debug!(connection_id = %guard.id(), error = %e, "TCP write failed");
        return;
    }
    let _ = stream.shutdown().await;
}
