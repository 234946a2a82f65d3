//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals into [`ShutdownSignal`] events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The coordinator only sees the [`SignalSource`] trait, so tests can feed
//!   events through a channel instead of raising real signals

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

/// A termination request from the operating environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Drain, then exit (SIGTERM).
    GracefulTerm,
    /// Exit now (SIGINT).
    ImmediateInterrupt,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::GracefulTerm => f.write_str("terminated"),
            ShutdownSignal::ImmediateInterrupt => f.write_str("interrupt"),
        }
    }
}

/// Something that yields termination events.
pub trait SignalSource {
    /// Wait for the next event. `None` means no event will ever arrive again.
    fn next_signal(&mut self) -> impl Future<Output = Option<ShutdownSignal>> + Send;
}

impl SignalSource for mpsc::UnboundedReceiver<ShutdownSignal> {
    fn next_signal(&mut self) -> impl Future<Output = Option<ShutdownSignal>> + Send {
        self.recv()
    }
}

/// Process signals: SIGTERM is graceful, SIGINT is immediate.
#[cfg(unix)]
pub struct OsSignals {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Register the handlers. From here on the default "die on signal"
    /// behavior no longer applies to SIGTERM and SIGINT.
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    fn next_signal(&mut self) -> impl Future<Output = Option<ShutdownSignal>> + Send {
        async move {
            tokio::select! {
                Some(()) = self.terminate.recv() => Some(ShutdownSignal::GracefulTerm),
                Some(()) = self.interrupt.recv() => Some(ShutdownSignal::ImmediateInterrupt),
                else => None,
            }
        }
    }
}

/// Process signals: Ctrl-C is immediate; there is no graceful signal.
#[cfg(not(unix))]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    fn next_signal(&mut self) -> impl Future<Output = Option<ShutdownSignal>> + Send {
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => Some(ShutdownSignal::ImmediateInterrupt),
                Err(e) => {
                    tracing::warn!(error = %e, "Ctrl-C handler failed");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_source_yields_then_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(ShutdownSignal::GracefulTerm).unwrap();
        tx.send(ShutdownSignal::ImmediateInterrupt).unwrap();
        drop(tx);

        assert_eq!(rx.next_signal().await, Some(ShutdownSignal::GracefulTerm));
        assert_eq!(rx.next_signal().await, Some(ShutdownSignal::ImmediateInterrupt));
        assert_eq!(rx.next_signal().await, None);
    }

    #[test]
    fn display_matches_signal_names() {
        assert_eq!(ShutdownSignal::GracefulTerm.to_string(), "terminated");
        assert_eq!(ShutdownSignal::ImmediateInterrupt.to_string(), "interrupt");
    }
}
