//! # roku-core
//!
//! Shared library for roku-bridge containing the ECP command model, the step
//! and sequence types, the SSDP message codec, and the text-to-keystroke
//! translator.
//!
//! This crate has zero dependencies on network sockets, HTTP clients, or async
//! runtimes.  Everything here can be unit-tested without a device on the LAN.
//!
//! # Architecture overview (for beginners)
//!
//! A Roku player exposes the *External Control Protocol* (ECP): a tiny HTTP
//! API on port 8060 where every remote-control button is a URL path such as
//! `keypress/home` or `launch/12`.  Pressing a button means sending an empty
//! POST to that URL.
//!
//! The bridge turns one inbound request ("search for this show") into a timed
//! series of such button presses.  This crate defines:
//!
//! - **`domain`** – What a button press is ([`Command`]), how presses and
//!   pauses are ordered ([`Step`], [`Sequence`]), the well-known channel ids
//!   ([`Channel`]), and the shared, discovered device address
//!   ([`DeviceLocation`]).
//!
//! - **`ssdp`** – The text format of the UDP discovery protocol used to find
//!   the player on the LAN without any manual IP configuration.
//!
//! - **`translate`** – Converts free text into one literal keypress per
//!   character, with a short pause after each.

pub mod domain;
pub mod ssdp;
pub mod translate;

pub use domain::channel::Channel;
pub use domain::command::{format_command, Command, Key};
pub use domain::location::DeviceLocation;
pub use domain::sequence::{Sequence, SequenceBuilder, Step};
pub use ssdp::{SearchRequest, SsdpError, SsdpResponse};
pub use translate::{translate, TYPE_DELAY_MS};
