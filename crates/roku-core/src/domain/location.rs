//! The shared, discovered device base address.
//!
//! # Why a lock? (for beginners)
//!
//! The bridge runs on Tokio's multi-threaded runtime.  The discovery listener
//! may write a new address on one worker thread at the exact moment a running
//! sequence reads it on another.  A [`RwLock`] lets any number of readers in
//! at once while giving a writer exclusive access, so a reader never observes
//! a half-written `String`.
//!
//! The lock is only ever held for the duration of a clone or an assignment,
//! never across an `.await`, so a plain `std::sync::RwLock` is sufficient.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Process-wide cell holding the device's base URL, or nothing if the device
/// has not been found yet.
///
/// Cloning a `DeviceLocation` is cheap and yields a handle to the *same* cell.
/// Once set, the value is never cleared; a later discovery response simply
/// overwrites it (last response wins).
#[derive(Debug, Clone, Default)]
pub struct DeviceLocation {
    inner: Arc<RwLock<Option<String>>>,
}

impl DeviceLocation {
    /// Creates an empty cell (device not yet discovered).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cell pre-seeded with a known base address.
    pub fn with_address(address: impl Into<String>) -> Self {
        let cell = Self::new();
        cell.set(address);
        cell
    }

    /// Returns a copy of the current base address, if one is known.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` once any address has been recorded.
    pub fn is_known(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Unconditionally records `address`, replacing any previous value.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set(&self, address: impl Into<String>) -> bool {
        let address = address.into();
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.as_deref() == Some(address.as_str()) {
            return false;
        }
        debug!(previous = ?*guard, new = %address, "device location updated");
        *guard = Some(address);
        true
    }
}
