//! roku-bridge library crate.
//!
//! Converts inbound HTTP requests (typically from a voice-assistant webhook)
//! into timed series of ECP commands sent to a Roku player that is located
//! automatically on the LAN.
//!
//! # Architecture
//!
//! ```text
//! Voice assistant / curl  (HTTP, /roku/<routine>)
//!         ↓
//! [roku-bridge]
//!   ├── application/
//!   │     ├── run_sequence     CommandSequencer + ActionExecutor seam
//!   │     ├── discover_device  DiscoveryAgent: tick + response handling
//!   │     └── routines         Route name → Sequence table
//!   └── infrastructure/
//!         ├── http_server      axum router, answers before the sequence ends
//!         ├── network/ecp      reqwest executor (POST + drain body)
//!         ├── network/ssdp     UDP socket: M-SEARCH out, replies in
//!         └── storage/config   TOML config file
//!         ↓
//! Roku player  (ECP over HTTP, port 8060)
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `roku-core` and on traits it defines itself; it
//!   never names `reqwest`, `axum`, or a socket type.
//! - `infrastructure` implements those traits and owns every I/O resource.

/// Application layer: sequencing, discovery logic, and the routine table.
pub mod application;

/// Infrastructure layer: HTTP server, HTTP client, UDP socket, config file.
pub mod infrastructure;
