//! Socket construction for the responders.
//!
//! # Responsibilities
//! - Open IPv6 wildcard sockets as dual-stack (`IPV6_V6ONLY` off), so one
//!   socket answers IPv4 and IPv6 clients
//! - Fall back to the IPv4 wildcard when IPv6 is unavailable on the host
//!
//! # Design Decisions
//! - `AddrInUse` never triggers the fallback; the port really is taken
//! - Sockets are built non-blocking and handed to tokio

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use socket2::{Domain, SockAddr, Socket, Type};
use tokio::net::{TcpListener, UdpSocket};

/// Pending-connection queue length for TCP listeners.
const LISTEN_BACKLOG: i32 = 1024;

/// Bind a TCP listener on `addr`. Must be called inside a tokio runtime.
pub fn tcp_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = with_ipv4_fallback(addr, |addr| {
        let socket = open(addr, Type::STREAM, socket2::Protocol::TCP)?;
        #[cfg(unix)]
        socket.set_reuse_address(true)?;
        socket.bind(&SockAddr::from(addr))?;
        socket.listen(LISTEN_BACKLOG)?;
        Ok(socket)
    })?;
    TcpListener::from_std(socket.into())
}

/// Bind a UDP socket on `addr`. Must be called inside a tokio runtime.
pub fn udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = with_ipv4_fallback(addr, |addr| {
        let socket = open(addr, Type::DGRAM, socket2::Protocol::UDP)?;
        socket.bind(&SockAddr::from(addr))?;
        Ok(socket)
    })?;
    UdpSocket::from_std(socket.into())
}

fn open(addr: SocketAddr, ty: Type, protocol: socket2::Protocol) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), ty, Some(protocol))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn with_ipv4_fallback<F>(addr: SocketAddr, bind: F) -> io::Result<Socket>
where
    F: Fn(SocketAddr) -> io::Result<Socket>,
{
    match bind(addr) {
        Err(e) if addr.is_ipv6() && addr.ip().is_unspecified() && e.kind() != io::ErrorKind::AddrInUse => {
            let fallback = SocketAddr::from((Ipv4Addr::UNSPECIFIED, addr.port()));
            tracing::warn!(address = %addr, fallback = %fallback, error = %e, "IPv6 unavailable, binding IPv4 only");
            bind(fallback)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv6_loopback_available() -> bool {
        std::net::TcpListener::bind("[::1]:0").is_ok()
    }

    #[tokio::test]
    async fn wildcard_tcp_accepts_both_families() {
        if !ipv6_loopback_available() {
            return;
        }
        let listener = tcp_listener("[::]:0".parse().unwrap()).unwrap();
        let port = listener.local_addr().unwrap().port();

        let v4 = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let (_, peer) = listener.accept().await.unwrap();
        assert_eq!(peer.ip().to_canonical(), v4.local_addr().unwrap().ip());

        let _v6 = tokio::net::TcpStream::connect(("::1", port)).await.unwrap();
        let (_, peer) = listener.accept().await.unwrap();
        assert!(peer.is_ipv6());
    }

    #[tokio::test]
    async fn wildcard_udp_receives_ipv4() {
        let socket = udp_socket("[::]:0".parse().unwrap()).unwrap();
        let port = socket.local_addr().unwrap().port();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"x", ("127.0.0.1", port)).await.unwrap();

        let mut buf = [0u8; 4];
        let (_, peer) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(
            SocketAddr::new(peer.ip().to_canonical(), peer.port()),
            client.local_addr().unwrap()
        );
    }

    #[tokio::test]
    async fn port_in_use_is_not_retried_on_ipv4() {
        let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = tcp_listener(SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, port))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }
}
