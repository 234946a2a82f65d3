//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process arguments
//!     → cli.rs (normalize single-dash flags, parse with clap)
//!     → validation.rs (mode exclusivity)
//!     → ListenerConfig (validated, immutable)
//!     → passed by value to the bootstrap
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload
//! - No mode selected means HTTP
//! - HTTP is exclusive with TCP/UDP; TCP and UDP may share the port

pub mod cli;
pub mod schema;
pub mod validation;

pub use cli::Args;
pub use schema::{ListenerConfig, Protocol, DEFAULT_PORT};
pub use validation::ConfigError;
