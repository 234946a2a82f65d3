//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (protocol, port, client, connection_id, signal)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stderr, filtered by RUST_LOG)
//! ```

pub mod logging;
