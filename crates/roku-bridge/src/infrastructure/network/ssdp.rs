//! UDP socket for SSDP discovery.
//!
//! One socket, bound to an ephemeral port, does both jobs:
//!
//! 1. The ticker task asks the [`DiscoveryAgent`] to tick; while the player is
//!    unknown the agent calls back into [`UdpDiscoveryTransport::send_query`],
//!    which multicasts an `M-SEARCH` to `239.255.255.250:1900`.
//!
//! 2. The listener task receives the unicast replies on the same socket and
//!    hands each datagram to [`DiscoveryAgent::handle_datagram`].
//!
//! # Read timeout
//!
//! `recv_from` is wrapped in a 500 ms timeout.  On each timeout the listener
//! checks the `running` flag and exits once the bridge is shutting down.  A
//! receive error is logged and followed by the same 500 ms pause before the
//! next attempt.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use roku_core::SearchRequest;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, trace};

use crate::application::{DiscoveryAgent, DiscoveryError, DiscoveryTransport};

/// How long a single `recv_from` waits before re-checking the running flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// Largest datagram the listener accepts.
const MAX_DATAGRAM: usize = 4096;

/// [`DiscoveryTransport`] that multicasts search queries over UDP.
#[derive(Debug, Clone)]
pub struct UdpDiscoveryTransport {
    socket: Arc<UdpSocket>,
    target: SocketAddr,
}

impl UdpDiscoveryTransport {
    /// Binds the discovery socket on `bind_addr` and aims queries at `target`
    /// (normally the SSDP multicast group).
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::InvalidTarget`] if `target` is not `ip:port`, and
    /// [`DiscoveryError::BindFailed`] if the socket cannot be bound.
    pub async fn bind(bind_addr: SocketAddr, target: &str) -> Result<Self, DiscoveryError> {
        let target: SocketAddr = target
            .parse()
            .map_err(|_| DiscoveryError::InvalidTarget(target.to_string()))?;
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| DiscoveryError::BindFailed {
                addr: bind_addr,
                source,
            })?;

        Ok(Self {
            socket: Arc::new(socket),
            target,
        })
    }

    /// The socket replies arrive on.
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl DiscoveryTransport for UdpDiscoveryTransport {
    async fn send_query(&self, request: &SearchRequest) -> Result<(), DiscoveryError> {
        let bytes = request.to_bytes();
        self.socket
            .send_to(&bytes, self.target)
            .await
            .map_err(|source| DiscoveryError::SendFailed {
                target: self.target,
                source,
            })?;
        trace!("sent {} byte M-SEARCH to {}", bytes.len(), self.target);
        Ok(())
    }
}

/// Handles of the two discovery tasks.
#[derive(Debug)]
pub struct DiscoveryTasks {
    pub ticker: JoinHandle<()>,
    pub listener: JoinHandle<()>,
}

/// Spawns the ticker and the listener.  Both stop once `running` is cleared.
pub fn start_discovery(
    agent: Arc<DiscoveryAgent>,
    socket: Arc<UdpSocket>,
    period: Duration,
    running: Arc<AtomicBool>,
) -> DiscoveryTasks {
    if let Ok(addr) = socket.local_addr() {
        info!("discovery listening on UDP {addr}");
    }

    let ticker = tokio::spawn(Arc::clone(&agent).run_ticker(period, Arc::clone(&running)));
    let listener = tokio::spawn(listen_loop(agent, socket, running));

    DiscoveryTasks { ticker, listener }
}

/// Receives datagrams until `running` is cleared.
async fn listen_loop(agent: Arc<DiscoveryAgent>, socket: Arc<UdpSocket>, running: Arc<AtomicBool>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    while running.load(Ordering::Relaxed) {
        let (len, src) = match timeout(RECV_TIMEOUT, socket.recv_from(&mut buf)).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                recv_error_backoff(&e).await;
                continue;
            }
            Err(_) => continue,
        };

        agent.handle_datagram(&buf[..len], src);
    }

    debug!("discovery listener stopped");
}

/// Logs a receive error and waits one [`RECV_TIMEOUT`] so a socket stuck in
/// an error state cannot spin the listener.
async fn recv_error_backoff(e: &std::io::Error) {
    error!("discovery recv error: {e}; retrying in {RECV_TIMEOUT:?}");
    tokio::time::sleep(RECV_TIMEOUT).await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
