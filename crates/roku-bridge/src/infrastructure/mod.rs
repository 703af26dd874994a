//! Infrastructure layer for roku-bridge.
//!
//! Contains the I/O adapters: the inbound HTTP server, the outbound ECP client,
//! the SSDP discovery socket, and the config file store.
//!
//! **Dependency rule**: this layer may depend on `application` and `roku_core`,
//! but MUST NOT be imported by the `application` layer.

pub mod http_server;
pub mod network;
pub mod storage;
