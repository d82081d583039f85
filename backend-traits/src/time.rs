//! Time abstraction.
//!
//! Provides an injectable time source so that the watchdog and timeout
//! machinery in the core can be tested deterministically.

use chrono::{DateTime, Utc};

/// Time source trait.
///
/// Abstracts system time to enable deterministic testing. The resilience
/// layer computes stall and settings deadlines against this clock instead of
/// reading system time directly.
///
/// # Example
///
/// ```ignore
/// use backend_traits::time::Clock;
///
/// fn log_timestamp(clock: &dyn Clock) {
///     let now = clock.now();
///     println!("Current time: {}", now);
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }

    /// Get current Unix timestamp in milliseconds
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
