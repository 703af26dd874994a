//! SSDP (Simple Service Discovery Protocol) message codec.
//!
//! # How SSDP discovery works (for beginners)
//!
//! SSDP is HTTP-shaped text carried in UDP datagrams:
//!
//! 1. The bridge sends an `M-SEARCH` request to the multicast group
//!    `239.255.255.250:1900`.  Every SSDP-capable device on the LAN receives
//!    it.  The `ST` ("search target") header says which kind of device we are
//!    looking for; Roku players answer to `roku:ecp`.
//!
//! 2. A matching device replies with a *unicast* `HTTP/1.1 200 OK` datagram
//!    sent straight back to the socket the search came from.  Its `LOCATION`
//!    header holds the base URL of the device's ECP API, e.g.
//!    `http://192.168.1.20:8060/`.
//!
//! Nothing about this exchange is reliable: queries and replies can be lost
//! or duplicated, and replies are not tied to a particular query.  The bridge
//! therefore simply re-queries on a timer until some reply arrives.
//!
//! This module only builds and parses the text; sockets live in the bridge's
//! infrastructure layer.

pub mod message;

pub use message::{SearchRequest, SsdpError, SsdpResponse};

/// The SSDP IPv4 multicast group and port.
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Search target advertised by Roku players.
pub const ROKU_SEARCH_TARGET: &str = "roku:ecp";

/// Default `MX` (maximum wait, in seconds) advertised in searches.
pub const DEFAULT_MX: u8 = 3;
