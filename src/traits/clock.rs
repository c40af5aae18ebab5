//! Time source abstraction.
//!
//! The engine never reads the wall clock directly.  An [`Exchange`]
//! asks its [`Clock`] for the current time when it accrues the price
//! oracle or checks a router deadline, so hosts and tests control time
//! explicitly.
//!
//! [`Exchange`]: crate::Exchange

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Timestamp;

/// Supplies the current time in seconds.
///
/// Implementations must be cheap to call and safe to share across
/// threads.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Seconds since the Unix epoch, read from the operating system.
///
/// A system clock set before 1970 reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp::from_secs(secs)
    }
}

/// A manually driven clock.
///
/// Clones share the same underlying counter, so a test can hand one
/// clone to an [`Exchange`](crate::Exchange) and keep another to move
/// time forward.
///
/// # Examples
///
/// ```
/// use pairswap::traits::{Clock, ManualClock};
///
/// let clock = ManualClock::starting_at(100);
/// let handle = clock.clone();
/// handle.advance(20);
/// assert_eq!(clock.now().as_secs(), 120);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `secs`.
    #[must_use]
    pub fn starting_at(secs: u64) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(secs)),
        }
    }

    /// Moves the clock forward by `secs`, wrapping on overflow.
    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.secs.load(Ordering::SeqCst))
    }
}
