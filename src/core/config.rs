//! # Handle configuration.
//!
//! Provides [`HandleConfig`], the per-handle runtime settings.
//!
//! ## Sentinel values
//! - `kill_grace = 0s` → do not wait for cooperative exit; abort immediately
//! - `cleanup_timeout = 0s` → no timeout on `clean_up`

use std::time::Duration;

/// Configuration for a [`TaskHandle`](crate::TaskHandle).
///
/// ## Field semantics
/// - `bus_capacity`: Event ring buffer size (min 1; clamped by Bus)
/// - `kill_grace`: How long `kill()` waits for the execution unit to acknowledge cancellation
/// - `cleanup_timeout`: Upper bound for one `clean_up` call (`0s` = unbounded)
#[derive(Clone, Debug)]
pub struct HandleConfig {
    /// Capacity of the event broadcast ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Maximum time `kill()`/`dispose()` wait for the execution unit to stop.
    ///
    /// When exceeded, the tokio task is aborted and detached, and a warning is logged.
    pub kill_grace: Duration,

    /// Maximum time a single `clean_up` call may take.
    ///
    /// - `Duration::ZERO` = no timeout
    pub cleanup_timeout: Duration,
}

impl HandleConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the cleanup timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → each `clean_up` call is bounded by `d`
    #[inline]
    pub fn cleanup_timeout(&self) -> Option<Duration> {
        if self.cleanup_timeout == Duration::ZERO {
            None
        } else {
            Some(self.cleanup_timeout)
        }
    }
}

impl Default for HandleConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 256`
    /// - `kill_grace = 5s`
    /// - `cleanup_timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            bus_capacity: 256,
            kill_grace: Duration::from_secs(5),
            cleanup_timeout: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_decode() {
        let mut cfg = HandleConfig::default();
        assert_eq!(cfg.cleanup_timeout(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 256);

        cfg.bus_capacity = 0;
        cfg.cleanup_timeout = Duration::from_millis(250);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.cleanup_timeout(), Some(Duration::from_millis(250)));
    }
}
