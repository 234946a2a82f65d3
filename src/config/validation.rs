//! Configuration validation.
//!
//! # Responsibilities
//! - Reject mode selections that cannot be served by one process
//!
//! # Design Decisions
//! - Runs before any socket is opened
//! - Validation is a pure function of the selected modes

use thiserror::Error;

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("can't serve TCP/UDP mode and HTTP mode at the same time")]
    ConflictingModes,
}

/// Check that HTTP is not combined with a raw protocol.
pub fn validate_modes(tcp: bool, udp: bool, http: bool) -> Result<(), ConfigError> {
    if http && (tcp || udp) {
        return Err(ConfigError::ConflictingModes);
    }
    Ok(())
}
