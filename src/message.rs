//! Response payload shared by every responder.
//!
//! # Wire Format
//! ```text
//! {"server":"<hostname>", "client":"<addr:port>"}\n
//! ```
//!
//! The same line is written on TCP, sent back as a UDP datagram, and used
//! as the HTTP response body.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;

/// Name of the host answering requests.
///
/// Resolved once at startup and shared read-only by every listener task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity(Arc<str>);

impl ServerIdentity {
    /// Resolve the local host name.
    pub fn resolve() -> std::io::Result<Self> {
        let name = hostname::get()?;
        Ok(Self::from(name.to_string_lossy().as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServerIdentity {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for ServerIdentity {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Textual form of the peer that sent a request (`addr:port`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for ClientIdentity {
    /// IPv4 peers seen through a dual-stack socket keep their dotted form.
    fn from(addr: SocketAddr) -> Self {
        Self(SocketAddr::new(addr.ip().to_canonical(), addr.port()).to_string())
    }
}

impl From<&str> for ClientIdentity {
    fn from(client: &str) -> Self {
        Self(client.to_string())
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One answer to one request. Built per request and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    pub server: String,
    pub client: String,
}

impl ResponseMessage {
    /// Serialize as a single newline-terminated JSON line.
    pub fn to_line(&self) -> String {
        // serde_json::Value's Display is infallible and applies JSON string escaping.
        let server = serde_json::Value::from(self.server.as_str());
        let client = serde_json::Value::from(self.client.as_str());
        format!("{{\"server\":{}, \"client\":{}}}\n", server, client)
    }
}

/// Build the response for a request from `client` answered by `server`.
pub fn format(server: &ServerIdentity, client: &ClientIdentity) -> ResponseMessage {
    ResponseMessage {
        server: server.as_str().to_string(),
        client: client.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(server: &str, client: &str) -> String {
        format(&ServerIdentity::from(server), &ClientIdentity::from(client)).to_line()
    }

    #[test]
    fn wire_shape_matches() {
        assert_eq!(
            line("pod-7", "10.0.0.3:51234"),
            "{\"server\":\"pod-7\", \"client\":\"10.0.0.3:51234\"}\n"
        );
    }

    #[test]
    fn parses_back_to_inputs() {
        let cases = [
            ("host", "127.0.0.1:80"),
            ("we\"ird\\name", "[::1]:9376"),
            ("tab\there", "new\nline"),
            ("ünïcödé", "☃"),
        ];
        for (server, client) in cases {
            let out = line(server, client);
            assert!(out.ends_with('\n'));
            assert_eq!(out.matches('\n').count(), 1, "must stay on one line: {out:?}");

            let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
            let object = parsed.as_object().unwrap();
            assert_eq!(object.len(), 2);
            assert_eq!(object["server"], server);
            assert_eq!(object["client"], client);
        }
    }

    #[test]
    fn empty_strings_are_valid() {
        let msg: ResponseMessage = serde_json::from_str(&line("", "")).unwrap();
        assert_eq!(msg.server, "");
        assert_eq!(msg.client, "");
    }

    #[test]
    fn client_identity_from_socket_addr() {
        let v4: SocketAddr = "192.168.1.10:4000".parse().unwrap();
        let v6: SocketAddr = "[fe80::1]:4000".parse().unwrap();
        assert_eq!(ClientIdentity::from(v4).as_str(), "192.168.1.10:4000");
        assert_eq!(ClientIdentity::from(v6).as_str(), "[fe80::1]:4000");
    }

    #[test]
    fn v4_mapped_peer_is_reported_as_ipv4() {
        let mapped: SocketAddr = "[::ffff:10.0.0.1]:80".parse().unwrap();
        assert_eq!(ClientIdentity::from(mapped).as_str(), "10.0.0.1:80");

        let loopback: SocketAddr = "[::1]:80".parse().unwrap();
        assert_eq!(ClientIdentity::from(loopback).as_str(), "[::1]:80");
    }

    #[test]
    fn server_identity_clones_share_storage() {
        let a = ServerIdentity::from("node-a".to_string());
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "node-a");
    }
}
