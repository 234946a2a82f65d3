//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the server identity once
//! - Bind every enabled responder
//! - Start the responders and race them against the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every socket is bound before any responder starts (no partial success)
//! - Responders never return under normal operation; the first one that does
//!   ends the process

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::{ConfigError, ListenerConfig, Protocol};
use crate::http::HttpResponder;
use crate::lifecycle::shutdown::{ShutdownCoordinator, Termination};
use crate::lifecycle::signals::SignalSource;
use crate::message::ServerIdentity;
use crate::net::{ConnectionTracker, ListenerError, TcpResponder, UdpResponder};

/// Everything that stops the process before it serves traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("error resolving hostname: {0}")]
    Identity(#[source] io::Error),
    #[error("error installing signal handlers: {0}")]
    Signals(#[source] io::Error),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Validated configuration plus the resolved server identity.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    config: ListenerConfig,
    server: ServerIdentity,
}

impl Bootstrap {
    /// Resolve the host name for `config`.
    pub fn new(config: ListenerConfig) -> Result<Self, StartupError> {
        let server = ServerIdentity::resolve().map_err(StartupError::Identity)?;
        Ok(Self::with_identity(config, server))
    }

    /// Use a known identity instead of the host name.
    pub fn with_identity(config: ListenerConfig, server: ServerIdentity) -> Self {
        Self { config, server }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn server(&self) -> &ServerIdentity {
        &self.server
    }

    /// Bind every enabled responder on the configured port.
    pub async fn bind(self) -> Result<BoundServer, StartupError> {
        let addr = self.config.bind_address();
        let tracker = ConnectionTracker::new();
        let mut responders = Vec::new();

        for protocol in self.config.protocols() {
            let responder = match protocol {
                Protocol::Tcp => Responder::Tcp(TcpResponder::bind(addr, tracker.clone()).await?),
                Protocol::Udp => Responder::Udp(UdpResponder::bind(addr).await?),
                Protocol::Http => Responder::Http(HttpResponder::bind(addr, tracker.clone()).await?),
            };
            tracing::debug!(protocol = %protocol, address = %addr, "Listener bound");
            responders.push(responder);
        }

        Ok(BoundServer {
            responders,
            server: self.server,
            tracker,
        })
    }
}

enum Responder {
    Tcp(TcpResponder),
    Udp(UdpResponder),
    Http(HttpResponder),
}

impl Responder {
    fn protocol(&self) -> Protocol {
        match self {
            Responder::Tcp(_) => Protocol::Tcp,
            Responder::Udp(_) => Protocol::Udp,
            Responder::Http(_) => Protocol::Http,
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Responder::Tcp(r) => r.local_addr(),
            Responder::Udp(r) => r.local_addr(),
            Responder::Http(r) => r.local_addr(),
        }
    }

    async fn run(self, server: ServerIdentity) -> Result<(), ListenerError> {
        match self {
            Responder::Tcp(r) => r.run(server).await,
            Responder::Udp(r) => r.run(server).await,
            Responder::Http(r) => r.run(server).await,
        }
    }
}

/// Responders that are bound but not yet serving.
pub struct BoundServer {
    responders: Vec<Responder>,
    server: ServerIdentity,
    tracker: ConnectionTracker,
}

impl BoundServer {
    /// Local address of the responder for `protocol`, if enabled.
    pub fn local_addr(&self, protocol: Protocol) -> Option<SocketAddr> {
        self.responders
            .iter()
            .find(|r| r.protocol() == protocol)
            .and_then(|r| r.local_addr().ok())
    }

    /// In-flight connection counter shared by the responders.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Spawn one task per responder.
    pub fn start(self) -> RunningServer {
        let mut tasks = JoinSet::new();
        for responder in self.responders {
            let protocol = responder.protocol();
            let server = self.server.clone();
            tasks.spawn(async move {
                match responder.run(server).await {
                    Ok(()) => ListenerError::Stopped(protocol),
                    Err(e) => e,
                }
            });
        }
        RunningServer { tasks }
    }
}

/// Serving responders. Dropping this aborts them.
pub struct RunningServer {
    tasks: JoinSet<ListenerError>,
}

impl RunningServer {
    /// Wait for the first responder to fail.
    pub async fn failed(&mut self) -> ListenerError {
        match self.tasks.join_next().await {
            Some(Ok(error)) => error,
            Some(Err(e)) => ListenerError::Panicked(e.to_string()),
            None => std::future::pending().await,
        }
    }
}

/// Serve until the coordinator decides to exit or a responder fails.
pub async fn serve<S: SignalSource>(
    server: BoundServer,
    coordinator: &ShutdownCoordinator,
    signals: S,
) -> Result<Termination, ListenerError> {
    let mut running = server.start();

    tokio::select! {
        termination = coordinator.run(signals) => Ok(termination),
        error = running.failed() => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::DRAIN_PERIOD;
    use crate::lifecycle::signals::ShutdownSignal;
    use crate::message::ResponseMessage;
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpStream, UdpSocket};
    use tokio::sync::mpsc;

    fn bootstrap(tcp: bool, udp: bool, http: bool, port: u16) -> Bootstrap {
        let config = ListenerConfig::new(tcp, udp, http, port).unwrap();
        Bootstrap::with_identity(config, ServerIdentity::from("boot-host"))
    }

    fn loopback(addr: SocketAddr) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], addr.port()))
    }

    #[test]
    fn resolves_host_name() {
        let bootstrap = Bootstrap::new(ListenerConfig::default()).unwrap();
        assert!(bootstrap.config().http());
        assert_eq!(
            bootstrap.server().as_str(),
            hostname::get().unwrap().to_string_lossy()
        );
    }

    #[tokio::test]
    async fn binds_only_enabled_protocols() {
        let bound = bootstrap(true, true, false, 0).bind().await.unwrap();
        assert!(bound.local_addr(Protocol::Tcp).is_some());
        assert!(bound.local_addr(Protocol::Udp).is_some());
        assert!(bound.local_addr(Protocol::Http).is_none());
    }

    #[tokio::test]
    async fn tcp_and_udp_share_the_configured_port() {
        let scratch = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = scratch.local_addr().unwrap().port();
        drop(scratch);

        let bound = bootstrap(true, true, false, port).bind().await.unwrap();
        let tcp = bound.local_addr(Protocol::Tcp).unwrap();
        let udp = bound.local_addr(Protocol::Udp).unwrap();
        assert_eq!(tcp.port(), port);
        assert_eq!(udp.port(), port);

        let mut running = bound.start();
        let exchange = async {
            let mut stream = TcpStream::connect(loopback(tcp)).await.unwrap();
            let mut out = String::new();
            stream.read_to_string(&mut out).await.unwrap();
            let msg: ResponseMessage = serde_json::from_str(&out).unwrap();
            assert_eq!(msg.server, "boot-host");

            let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            socket.send_to(b"?", loopback(udp)).await.unwrap();
            let mut buf = [0u8; 256];
            let (len, _) = socket.recv_from(&mut buf).await.unwrap();
            let msg: ResponseMessage = serde_json::from_slice(&buf[..len]).unwrap();
            assert_eq!(msg.client, socket.local_addr().unwrap().to_string());
        };

        tokio::select! {
            () = exchange => {}
            error = running.failed() => panic!("responder failed: {error}"),
        }
    }

    #[tokio::test]
    async fn bind_failure_aborts_startup() {
        let taken = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = bootstrap(true, true, false, port).bind().await.err().unwrap();
        assert!(matches!(
            err,
            StartupError::Listener(ListenerError::Bind { protocol: Protocol::Udp, .. })
        ));
    }

    #[tokio::test]
    async fn serve_returns_when_interrupted() {
        let bound = bootstrap(false, false, true, 0).bind().await.unwrap();
        let coordinator = ShutdownCoordinator::new(DRAIN_PERIOD, bound.tracker().clone());
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ShutdownSignal::ImmediateInterrupt).unwrap();

        let termination = serve(bound, &coordinator, rx).await.unwrap();
        assert_eq!(termination, Termination::Interrupted);
    }
}
