//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum + hyper, HTTP/1.1)
//!     → TraceLayer (request span)
//!     → report handler (any method, any path)
//!     → SetResponseHeaderLayer (Connection: close)
//!     → Send to client, connection closed
//! ```

pub mod server;

pub use server::{build_router, AppState, HttpResponder};
