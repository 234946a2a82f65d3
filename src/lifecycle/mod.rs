//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     ListenerConfig → Resolve hostname → Bind responders → Start responders
//!
//! Signals (signals.rs):
//!     SIGTERM → GracefulTerm
//!     SIGINT  → ImmediateInterrupt
//!
//! Shutdown (shutdown.rs):
//!     GracefulTerm → Draining (responders keep serving) → 60s → Exit 0
//!     ImmediateInterrupt → Exit 0
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then identity, then listeners
//! - Exit is the only cancellation; no per-listener shutdown
//! - A responder failure ends the process even while draining

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{ShutdownCoordinator, ShutdownState, Termination, DRAIN_PERIOD};
pub use signals::{OsSignals, ShutdownSignal, SignalSource};
pub use startup::{serve, Bootstrap, BoundServer, RunningServer, StartupError};
