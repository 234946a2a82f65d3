//! Shared utilities for integration tests.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// Find a port that is currently free for both TCP and UDP.
#[allow(dead_code)]
pub fn free_port() -> u16 {
    loop {
        let tcp = TcpListener::bind("0.0.0.0:0").unwrap();
        let port = tcp.local_addr().unwrap().port();
        if std::net::UdpSocket::bind(("0.0.0.0", port)).is_ok() {
            return port;
        }
    }
}

/// Loopback address for `port`.
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Poll until something accepts TCP connections on `port`.
#[allow(dead_code)]
pub fn wait_for_tcp(port: u16) -> bool {
    for _ in 0..100 {
        if TcpStream::connect_timeout(&loopback(port), Duration::from_millis(100)).is_ok() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}
