//! Time sources for the owning thread's task runner

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic clock measured from the moment it was created
///
/// `System` follows wall time; `Manual` only moves when told to, which keeps
/// timer-driven behaviour deterministic under test.
#[derive(Debug)]
pub enum Clock {
    /// Real monotonic time
    System {
        /// Instant the clock was created
        origin: Instant,
    },
    /// Time advanced explicitly by the caller
    Manual {
        /// Current reading
        now: Cell<Duration>,
    },
}

impl Clock {
    /// Create a clock backed by `Instant`
    pub fn system() -> Self {
        Self::System {
            origin: Instant::now(),
        }
    }

    /// Create a manual clock starting at zero
    pub fn manual() -> Self {
        Self::Manual {
            now: Cell::new(Duration::ZERO),
        }
    }

    /// Time elapsed since the clock was created
    pub fn now(&self) -> Duration {
        match self {
            Self::System { origin } => origin.elapsed(),
            Self::Manual { now } => now.get(),
        }
    }

    /// Whether this clock only moves when advanced
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual { .. })
    }

    /// Move a manual clock forward to `time`
    ///
    /// Never moves backwards. Has no effect on a system clock.
    pub fn set(&self, time: Duration) {
        if let Self::Manual { now } = self {
            if time > now.get() {
                now.set(time);
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

/// Convert a millisecond count into a `Duration`
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_forward() {
        let clock = Clock::manual();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.set(millis(100));
        assert_eq!(clock.now(), millis(100));

        clock.set(millis(50));
        assert_eq!(clock.now(), millis(100));
    }

    #[test]
    fn test_system_clock_ignores_set() {
        let clock = Clock::system();
        clock.set(Duration::from_secs(3600));
        assert!(clock.now() < Duration::from_secs(3600));
        assert!(!clock.is_manual());
    }
}
