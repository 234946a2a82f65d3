//! Configuration schema definitions.
//!
//! A `ListenerConfig` is only ever built through [`ListenerConfig::new`],
//! which applies the HTTP default and the mode-exclusivity check. Once built
//! it is read-only.

use std::fmt;
use std::net::{Ipv6Addr, SocketAddr};

use crate::config::validation::{validate_modes, ConfigError};

/// Port used when none is given on the command line.
pub const DEFAULT_PORT: u16 = 9376;

/// Wire protocol served by a responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Http,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
            Protocol::Http => f.write_str("HTTP"),
        }
    }
}

/// Which responders to run, and on which port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    tcp: bool,
    udp: bool,
    http: bool,
    port: u16,
}

impl ListenerConfig {
    /// Build a validated configuration from the raw mode selection.
    ///
    /// Selecting nothing means HTTP. HTTP cannot be combined with TCP or UDP.
    pub fn new(tcp: bool, udp: bool, http: bool, port: u16) -> Result<Self, ConfigError> {
        let http = http || !(tcp || udp);
        validate_modes(tcp, udp, http)?;

        Ok(Self { tcp, udp, http, port })
    }

    pub fn tcp(&self) -> bool {
        self.tcp
    }

    pub fn udp(&self) -> bool {
        self.udp
    }

    pub fn http(&self) -> bool {
        self.http
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Enabled protocols, in startup order.
    pub fn protocols(&self) -> Vec<Protocol> {
        [
            (self.tcp, Protocol::Tcp),
            (self.udp, Protocol::Udp),
            (self.http, Protocol::Http),
        ]
        .into_iter()
        .filter_map(|(enabled, protocol)| enabled.then_some(protocol))
        .collect()
    }

    /// Address every enabled responder binds to: the IPv6 wildcard, opened
    /// dual-stack so IPv4 clients reach it too.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            tcp: false,
            udp: false,
            http: true,
            port: DEFAULT_PORT,
        }
    }
}
