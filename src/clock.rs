//! Match clock derivation and injectable time source.
//!
//! The elapsed minute is always recomputed from wall time, never counted
//! from ticks, so a missed generation cycle cannot drift the clock.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Matches run a flat 90 minutes; the derived minute clamps here.
pub const FULL_TIME_MINUTE: u8 = 90;

/// Elapsed whole minutes since kickoff, clamped to [0, 90].
/// `now < kickoff` yields 0, never a negative value. Both instants are
/// UTC by construction, so mixed-zone subtraction cannot occur.
pub fn derived_minute(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let elapsed = now.signed_duration_since(kickoff).num_minutes();
    elapsed.clamp(0, FULL_TIME_MINUTE as i64) as u8
}

/// Injectable time source. Production uses [`SystemClock`]; tests pin
/// time with [`ManualClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
