//! iamyouare: report who answered and who asked.
//!
//! A diagnostic server that answers every TCP connection, UDP datagram or
//! HTTP request with one JSON line naming the server host and the client
//! address.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod message;
pub mod net;
pub mod observability;

pub use config::{Args, ListenerConfig, Protocol};
pub use lifecycle::{Bootstrap, ShutdownCoordinator, ShutdownSignal, Termination};
pub use message::{ClientIdentity, ResponseMessage, ServerIdentity};
