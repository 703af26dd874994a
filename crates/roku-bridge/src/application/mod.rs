//! Application layer for roku-bridge.
//!
//! Knows *what* to do with the device (which buttons, in which order, when to
//! look for it) and delegates *how* to the infrastructure layer through the
//! [`ActionExecutor`] and [`DiscoveryTransport`] traits.

pub mod discover_device;
pub mod routines;
pub mod run_sequence;

pub use discover_device::{DiscoveryAgent, DiscoveryError, DiscoveryTransport};
pub use routines::{Routine, RoutineError, RoutineTable};
pub use run_sequence::{
    ActionError, ActionExecutor, CommandSequencer, CompletionCallback, SequenceOutcome,
};
