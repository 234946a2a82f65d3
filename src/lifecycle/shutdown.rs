//! Shutdown coordination.
//!
//! # State Machine
//! ```text
//! Running ──GracefulTerm──▶ Draining ──drain period──▶ Terminated (Drained)
//!    │                         │
//!    └──ImmediateInterrupt─────┴──────────────────────▶ Terminated (Interrupted)
//! ```
//!
//! Listeners keep serving while draining; only the exit is delayed. Signals
//! are handled for the whole lifetime of the coordinator, so an interrupt
//! during the drain still exits immediately. A repeated graceful signal does
//! not restart the countdown.

use std::future::pending;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::lifecycle::signals::{ShutdownSignal, SignalSource};
use crate::net::ConnectionTracker;

/// Time between a graceful signal and process exit.
pub const DRAIN_PERIOD: Duration = Duration::from_secs(60);

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    Terminated,
}

/// How the coordinator reached `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An immediate interrupt arrived.
    Interrupted,
    /// The drain period elapsed after a graceful signal.
    Drained,
}

/// Decides when the process exits.
pub struct ShutdownCoordinator {
    drain_period: Duration,
    tracker: ConnectionTracker,
    state: watch::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    /// Create a coordinator in the `Running` state.
    ///
    /// `tracker` is only used to report in-flight connections in the logs.
    pub fn new(drain_period: Duration, tracker: ConnectionTracker) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            drain_period,
            tracker,
            state,
        }
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    /// Handle signals until the process should exit.
    ///
    /// If `signals` closes while running, this never returns; if it closes
    /// while draining, the countdown still completes.
    pub async fn run<S: SignalSource>(&self, mut signals: S) -> Termination {
        let mut deadline: Option<Instant> = None;
        let mut signals_open = true;

        loop {
            let drained = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => pending::<()>().await,
                }
            };

            tokio::select! {
                signal = signals.next_signal(), if signals_open => match signal {
                    Some(signal) => {
                        tracing::info!(signal = %signal, "Received signal");
                        match signal {
                            ShutdownSignal::ImmediateInterrupt => {
                                tracing::info!("Exiting immediately");
                                return self.terminate(Termination::Interrupted);
                            }
                            ShutdownSignal::GracefulTerm if deadline.is_some() => {
                                tracing::info!("Already draining");
                            }
                            ShutdownSignal::GracefulTerm => {
                                tracing::info!(
                                    drain_secs = self.drain_period.as_secs(),
                                    active_connections = self.tracker.active_count(),
                                    "Draining before exit"
                                );
                                deadline = Some(Instant::now() + self.drain_period);
                                self.state.send_replace(ShutdownState::Draining);
                            }
                        }
                    }
                    None => {
                        tracing::warn!("Signal source closed");
                        signals_open = false;
                    }
                },
                () = drained => {
                    return self.terminate(Termination::Drained);
                }
            }
        }
    }

    fn terminate(&self, termination: Termination) -> Termination {
        tracing::info!(
            ?termination,
            active_connections = self.tracker.active_count(),
            "Shutting down"
        );
        self.state.send_replace(ShutdownState::Terminated);
        termination
    }
}
