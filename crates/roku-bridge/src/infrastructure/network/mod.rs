//! Network infrastructure.
//!
//! # Sub-modules
//!
//! - **`ecp`** – Sends each ECP command to the player as an empty HTTP POST
//!   and drains the response body.  Implements [`ActionExecutor`].
//!
//! - **`ssdp`** – Owns the UDP socket used for discovery: multicasts
//!   `M-SEARCH` queries (implements [`DiscoveryTransport`]) and feeds every
//!   reply to the [`DiscoveryAgent`].
//!
//! [`ActionExecutor`]: crate::application::ActionExecutor
//! [`DiscoveryTransport`]: crate::application::DiscoveryTransport
//! [`DiscoveryAgent`]: crate::application::DiscoveryAgent

pub mod ecp;
pub mod ssdp;
