//! Wall-clock time source.
//!
//! Credentials carry unix-second timestamps that must be read fresh for every
//! call. Production code uses `SystemClock`; tests substitute a fixed clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds.
    fn unix_seconds(&self) -> u64;
}

/// Clock backed by `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn unix_seconds(&self) -> u64 {
        (**self).unix_seconds()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn unix_seconds(&self) -> u64 {
        (**self).unix_seconds()
    }
}
