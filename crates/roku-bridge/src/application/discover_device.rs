//! DiscoveryAgent: keeps [`DeviceLocation`] pointed at the Roku on the LAN.
//!
//! The agent has two independent halves:
//!
//! - **Ticker** – every `interval` (1 s by default) it calls [`tick`].  If no
//!   address is known yet, `tick` multicasts one SSDP `M-SEARCH`; otherwise it
//!   does nothing.  Discovery is need-based: once an address is known the
//!   agent stays quiet for the rest of the process lifetime.
//!
//! - **Listener** – the infrastructure layer feeds every datagram that arrives
//!   on the discovery socket to [`handle_datagram`].  Any well-formed search
//!   response with a `LOCATION` header overwrites the stored address, whether
//!   or not a query is outstanding.
//!
//! [`tick`]: DiscoveryAgent::tick
//! [`handle_datagram`]: DiscoveryAgent::handle_datagram

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use roku_core::{DeviceLocation, SearchRequest, SsdpResponse};
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Default period between discovery ticks.
pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest period the ticker runs with.
pub const MIN_DISCOVERY_INTERVAL: Duration = Duration::from_millis(1);

/// Error type for discovery socket operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The configured multicast target is not a socket address.
    #[error("invalid SSDP target address {0:?}")]
    InvalidTarget(String),
    /// A search datagram could not be sent.
    #[error("failed to send search to {target}: {source}")]
    SendFailed {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Sends discovery queries onto the network.
///
/// The infrastructure implementation multicasts over UDP; tests use a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    /// Emits one search query.
    async fn send_query(&self, request: &SearchRequest) -> Result<(), DiscoveryError>;
}

/// Locates the device and records its base URL in a shared [`DeviceLocation`].
pub struct DiscoveryAgent {
    transport: Arc<dyn DiscoveryTransport>,
    location: DeviceLocation,
    request: SearchRequest,
    queries_sent: AtomicU64,
}

impl DiscoveryAgent {
    pub fn new(
        transport: Arc<dyn DiscoveryTransport>,
        location: DeviceLocation,
        search_target: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            location,
            request: SearchRequest::new(search_target),
            queries_sent: AtomicU64::new(0),
        }
    }

    /// The cell this agent writes to.
    pub fn location(&self) -> &DeviceLocation {
        &self.location
    }

    /// Number of queries successfully sent so far.
    pub fn queries_sent(&self) -> u64 {
        self.queries_sent.load(Ordering::Relaxed)
    }

    /// One discovery period: query only if the device is still unknown.
    ///
    /// Returns `true` if a query went out.  A send failure is logged and
    /// reported as `false`; the next tick simply tries again.
    pub async fn tick(&self) -> bool {
        if self.location.is_known() {
            trace!("device location known; skipping search");
            return false;
        }

        match self.transport.send_query(&self.request).await {
            Ok(()) => {
                self.queries_sent.fetch_add(1, Ordering::Relaxed);
                debug!(st = %self.request.search_target, "searching for device");
                true
            }
            Err(e) => {
                warn!("discovery search failed: {e}");
                false
            }
        }
    }

    /// Processes one datagram received on the discovery socket.
    ///
    /// Returns the recorded location if the datagram was a search response
    /// carrying one.  Anything else is dropped with a debug log.
    pub fn handle_datagram(&self, datagram: &[u8], from: SocketAddr) -> Option<String> {
        let response = match SsdpResponse::parse(datagram) {
            Ok(r) => r,
            Err(e) => {
                debug!("ignoring datagram from {from}: {e}");
                return None;
            }
        };

        let location = match response.require_location() {
            Ok(l) => l.to_string(),
            Err(e) => {
                debug!("ignoring response from {from}: {e}");
                return None;
            }
        };

        if self.location.set(location.clone()) {
            info!("found Roku at {location} (reply from {from})");
        }
        Some(location)
    }

    /// Calls [`tick`](Self::tick) every `period` until `running` is cleared.
    ///
    /// The first tick fires immediately.  A period below
    /// [`MIN_DISCOVERY_INTERVAL`] is raised to it.
    pub async fn run_ticker(self: Arc<Self>, period: Duration, running: Arc<AtomicBool>) {
        if period < MIN_DISCOVERY_INTERVAL {
            warn!("discovery interval {period:?} too short; using {MIN_DISCOVERY_INTERVAL:?}");
        }
        let mut ticker = interval(period.max(MIN_DISCOVERY_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if !running.load(Ordering::Relaxed) {
                break;
            }
            self.tick().await;
        }

        debug!("discovery ticker stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &[u8] =
        b"HTTP/1.1 200 OK\r\nST: roku:ecp\r\nLOCATION: http://192.168.1.20:8060/\r\n\r\n";

    fn peer() -> SocketAddr {
        "192.168.1.20:1900".parse().unwrap()
    }

    fn agent_with(mock: MockDiscoveryTransport, location: DeviceLocation) -> DiscoveryAgent {
        DiscoveryAgent::new(Arc::new(mock), location, "roku:ecp")
    }

    // ── tick() ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_tick_queries_when_location_unknown() {
        // Arrange
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query()
            .withf(|req| req.search_target == "roku:ecp")
            .times(1)
            .returning(|_| Ok(()));
        let agent = agent_with(mock, DeviceLocation::new());

        // Act
        let sent = agent.tick().await;

        // Assert
        assert!(sent);
        assert_eq!(agent.queries_sent(), 1);
    }

    #[tokio::test]
    async fn test_tick_is_silent_when_location_known() {
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query().times(0);
        let agent = agent_with(mock, DeviceLocation::with_address("http://10.0.0.1:8060/"));

        assert!(!agent.tick().await);
        assert!(!agent.tick().await);
    }

    #[tokio::test]
    async fn test_no_queries_after_response_and_never_rearmed() {
        // Arrange: exactly one query may go out over the whole test
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query().times(1).returning(|_| Ok(()));
        let agent = agent_with(mock, DeviceLocation::new());

        // Act
        assert!(agent.tick().await);
        agent.handle_datagram(REPLY, peer());
        let later: Vec<bool> = vec![agent.tick().await, agent.tick().await, agent.tick().await];

        // Assert
        assert_eq!(later, vec![false, false, false]);
        assert_eq!(agent.queries_sent(), 1);
    }

    #[tokio::test]
    async fn test_tick_send_failure_is_swallowed_and_retried() {
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query().times(2).returning(|_| {
            Err(DiscoveryError::SendFailed {
                target: "239.255.255.250:1900".parse().unwrap(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "network down"),
            })
        });
        let agent = agent_with(mock, DeviceLocation::new());

        assert!(!agent.tick().await);
        assert!(!agent.tick().await);
        assert_eq!(agent.queries_sent(), 0);
        assert!(!agent.location().is_known());
    }

    // ── handle_datagram() ─────────────────────────────────────────────────────

    #[test]
    fn test_response_sets_location() {
        let agent = agent_with(MockDiscoveryTransport::new(), DeviceLocation::new());

        let recorded = agent.handle_datagram(REPLY, peer());

        assert_eq!(recorded.as_deref(), Some("http://192.168.1.20:8060/"));
        assert_eq!(
            agent.location().get().as_deref(),
            Some("http://192.168.1.20:8060/")
        );
    }

    #[test]
    fn test_later_response_overwrites_location() {
        // Arrange
        let agent = agent_with(
            MockDiscoveryTransport::new(),
            DeviceLocation::with_address("http://10.0.0.1:8060/"),
        );
        let other = b"HTTP/1.1 200 OK\r\nLocation: http://10.0.0.2:8060/\r\n\r\n";

        // Act
        agent.handle_datagram(other, peer());

        // Assert – last response wins, no same-device check
        assert_eq!(
            agent.location().get().as_deref(),
            Some("http://10.0.0.2:8060/")
        );
    }

    #[test]
    fn test_malformed_datagrams_are_ignored() {
        let agent = agent_with(MockDiscoveryTransport::new(), DeviceLocation::new());

        assert_eq!(agent.handle_datagram(b"\xff\xfe", peer()), None);
        assert_eq!(agent.handle_datagram(b"NOTIFY * HTTP/1.1\r\n\r\n", peer()), None);
        assert_eq!(
            agent.handle_datagram(b"HTTP/1.1 200 OK\r\nST: roku:ecp\r\n\r\n", peer()),
            None
        );
        assert!(!agent.location().is_known());
    }

    // ── run_ticker() ──────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_ticker_queries_once_per_period_until_stopped() {
        // Arrange
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query().returning(|_| Ok(()));
        let agent = Arc::new(agent_with(mock, DeviceLocation::new()));
        let running = Arc::new(AtomicBool::new(true));

        // Act: ticks at t = 0, 1000, 2000, 3000 ms
        let handle = tokio::spawn(Arc::clone(&agent).run_ticker(
            DEFAULT_DISCOVERY_INTERVAL,
            Arc::clone(&running),
        ));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        running.store(false, Ordering::Relaxed);
        handle.await.expect("ticker panicked");

        // Assert
        assert_eq!(agent.queries_sent(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_with_zero_period_still_queries() {
        // Arrange
        let mut mock = MockDiscoveryTransport::new();
        mock.expect_send_query().returning(|_| Ok(()));
        let agent = Arc::new(agent_with(mock, DeviceLocation::new()));
        let running = Arc::new(AtomicBool::new(true));

        // Act: zero is raised to 1 ms, so ticks land at t = 0..=10 ms
        let handle = tokio::spawn(Arc::clone(&agent).run_ticker(
            Duration::ZERO,
            Arc::clone(&running),
        ));
        tokio::time::sleep(Duration::from_micros(10_500)).await;
        running.store(false, Ordering::Relaxed);
        handle.await.expect("ticker panicked");

        // Assert
        assert!(agent.queries_sent() >= 10);
    }
}
