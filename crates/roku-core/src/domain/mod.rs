//! Domain entities for roku-bridge.
//!
//! Pure types with no I/O: the ECP command vocabulary, the step/sequence
//! model that the sequencer drains, the channel table, and the shared device
//! location cell.
//!
//! Code in outer layers (the bridge's application and infrastructure modules)
//! depends on these types, but nothing here depends on them.

pub mod channel;
pub mod command;
pub mod location;
pub mod sequence;
