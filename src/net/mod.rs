//! Raw socket responders.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → tcp.rs (accept loop, one task per connection)
//!     → connection.rs (id + in-flight count)
//!     → one JSON line written, socket closed
//!
//! UDP datagram
//!     → udp.rs (single receive loop, 16-byte buffer)
//!     → one JSON datagram sent back to the sender
//! ```
//!
//! Both bind through socket.rs: `[::]` is dual-stack, with an IPv4 fallback.
//!
//! # Design Decisions
//! - TCP connections never wait on each other
//! - UDP handling is serial; each reply is a single send
//! - Accept/receive failures end the loop; nothing retries

pub mod connection;
pub mod listener;
pub mod socket;
pub mod tcp;
pub mod udp;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::ListenerError;
pub use tcp::TcpResponder;
pub use udp::UdpResponder;
