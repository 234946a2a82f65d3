//! Raw UDP responder.
//!
//! Datagrams are handled one after another in a single receive loop. Their
//! content is ignored; only the sender address matters.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::config::Protocol;
use crate::message::{self, ClientIdentity, ServerIdentity};
use crate::net::listener::ListenerError;
use crate::net::socket;

/// Receive buffer size. Longer datagrams are truncated.
pub const UDP_BUFFER_SIZE: usize = 16;

/// Answers every datagram with one JSON datagram sent back to the sender.
pub struct UdpResponder {
    socket: UdpSocket,
}

impl UdpResponder {
    /// Bind to `addr`.
    pub async fn bind(addr: SocketAddr) -> Result<Self, ListenerError> {
        let socket = socket::udp_socket(addr).map_err(ListenerError::bind(Protocol::Udp, addr))?;

        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    /// Receive until receiving fails. Only returns with an error.
    pub async fn run(self, server: ServerIdentity) -> Result<(), ListenerError> {
        let port = self.local_addr().map(|addr| addr.port()).unwrap_or_default();
        tracing::info!(protocol = %Protocol::Udp, port, "Serving");

        let mut buffer = [0u8; UDP_BUFFER_SIZE];
        loop {
            let (_, peer) = self
                .socket
                .recv_from(&mut buffer)
                .await
                .map_err(ListenerError::Receive)?;

            let client = ClientIdentity::from(peer);
            tracing::info!(client = %client, "UDP request");

            let line = message::format(&server, &client).to_line();
            if let Err(e) = self.socket.send_to(line.as_bytes(), peer).await {
                tracing::debug!(client = %client, error = %e, "UDP send failed");
            }
        }
    }
}
