//! iamyouare
//!
//! Answers TCP connections, UDP datagrams or HTTP requests with the server's
//! host name and the client's address.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────┐
//!   flags ───────▶│ config ──▶ Bootstrap ──▶ bind all responders   │
//!                 │                              │                 │
//!                 │          ┌───────────────────┼───────────┐     │
//!                 │          ▼                   ▼           ▼     │
//!   client ◀─────▶│    TcpResponder      UdpResponder  HttpResponder│
//!                 │          └──────── message::format ──────┘     │
//!                 │                                                │
//!   SIGTERM/INT ─▶│ ShutdownCoordinator ──▶ exit 0 (now or +60s)   │
//!                 └────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use iamyouare::config::Args;
use iamyouare::lifecycle::{self, Bootstrap, OsSignals, ShutdownCoordinator, StartupError, Termination, DRAIN_PERIOD};
use iamyouare::observability;

#[tokio::main]
async fn main() -> ExitCode {
    observability::logging::init();

    match run(Args::from_env()).await {
        Ok(termination) => {
            tracing::info!(?termination, "Exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<Termination, StartupError> {
    let config = args.into_config()?;
    let bootstrap = Bootstrap::new(config)?;

    tracing::info!(
        server = %bootstrap.server(),
        port = config.port(),
        protocols = ?config.protocols(),
        "iamyouare v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // Installed before any socket answers.
    let signals = OsSignals::install().map_err(StartupError::Signals)?;

    let server = bootstrap.bind().await?;
    let coordinator = ShutdownCoordinator::new(DRAIN_PERIOD, server.tracker().clone());

    Ok(lifecycle::serve(server, &coordinator, signals).await?)
}
