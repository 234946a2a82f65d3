//! Errors shared by every responder.
//!
//! # Responsibilities
//! - Describe bind failures (startup) and loop failures (runtime)
//! - Name the responder in the final log line
//!
//! # Design Decisions
//! - Accept/receive/serve failures are fatal; the loop returns instead of
//!   retrying and the caller decides how the process ends

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::Protocol;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind the responder's socket.
    #[error("{protocol} listen on {addr} failed: {source}")]
    Bind {
        protocol: Protocol,
        addr: SocketAddr,
        source: io::Error,
    },
    /// Failed to accept a TCP connection.
    #[error("TCP accept failed: {0}")]
    Accept(#[source] io::Error),
    /// Failed to receive a UDP datagram.
    #[error("UDP receive failed: {0}")]
    Receive(#[source] io::Error),
    /// The HTTP server stopped with an error.
    #[error("HTTP serve failed: {0}")]
    Serve(#[source] io::Error),
    /// The responder returned although it should serve forever.
    #[error("{0} responder stopped unexpectedly")]
    Stopped(Protocol),
    /// A responder task panicked.
    #[error("responder task failed: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Wrap a bind failure for `protocol` on `addr`.
    pub fn bind(protocol: Protocol, addr: SocketAddr) -> impl FnOnce(io::Error) -> Self {
        move |source| ListenerError::Bind {
            protocol,
            addr,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_protocol_and_address() {
        let addr: SocketAddr = "0.0.0.0:9376".parse().unwrap();
        let err = ListenerError::bind(Protocol::Udp, addr)(io::Error::from(io::ErrorKind::AddrInUse));
        let message = err.to_string();
        assert!(message.starts_with("UDP listen on 0.0.0.0:9376 failed"), "{message}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn stopped_names_the_responder() {
        assert_eq!(
            ListenerError::Stopped(Protocol::Http).to_string(),
            "HTTP responder stopped unexpectedly"
        );
    }
}
