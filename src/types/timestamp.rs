use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Hybrid logical clock timestamp. The logical counter disambiguates entries
/// created within the same wall-clock millisecond, so ledger ordering by
/// `created_at` is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub millis: u64,   // Milliseconds since epoch
    pub logical: u64,  // Monotonic counter within a millisecond
}

impl Timestamp {
    pub fn now() -> Self {
        CLOCK.now()
    }

    pub fn from_millis(millis: u64) -> Self {
        Timestamp { millis, logical: 0 }
    }

    /// Calendar day as days since epoch, used for the one-credit-per-day
    /// idempotency rule.
    pub fn day(&self) -> u64 {
        self.millis / MILLIS_PER_DAY
    }

    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.millis.saturating_sub(earlier.millis)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.millis, self.logical)
    }
}

const LOGICAL_BITS: u32 = 20;
const LOGICAL_MASK: u64 = (1 << LOGICAL_BITS) - 1;

pub struct HybridLogicalClock {
    /// Millis in the high bits, logical counter in the low bits. One CAS
    /// covers both components, so no two calls can observe the same pair.
    last: AtomicU64,
}

impl HybridLogicalClock {
    pub fn new() -> Self {
        HybridLogicalClock {
            last: AtomicU64::new(0),
        }
    }

    pub fn now(&self) -> Timestamp {
        let wall_clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let last_millis = prev >> LOGICAL_BITS;
            let last_logical = prev & LOGICAL_MASK;

            let (millis, logical) = if wall_clock > last_millis {
                (wall_clock, 0)
            } else if last_logical < LOGICAL_MASK {
                // Wall clock same or went backward, increment logical
                (last_millis, last_logical + 1)
            } else {
                // Logical counter saturated within this millisecond
                (last_millis + 1, 0)
            };

            match self.last.compare_exchange(
                prev,
                (millis << LOGICAL_BITS) | logical,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Timestamp { millis, logical },
                Err(current) => prev = current,
            }
        }
    }
}

lazy_static::lazy_static! {
    static ref CLOCK: HybridLogicalClock = HybridLogicalClock::new();
}
