//! The time source used for every expiration decision in the cache.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// A source of "now" for the cache.
///
/// A cache reads exactly one clock for its whole lifetime: `set` stamps
/// entries with it, and both lookups and the janitor compare against it.
///
/// Any `Fn() -> DateTime<Utc>` closure is a `Clock`, so a fixed or scripted
/// time can be injected without a dedicated type.
pub trait Clock: Send + Sync + 'static {
  /// Returns the current time.
  fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
  F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
{
  #[inline]
  fn now(&self) -> DateTime<Utc> {
    self()
  }
}

/// The default clock, backed by the system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  #[inline]
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the cache owns another.
///
/// ```
/// use fibre_ttl::time::{Clock, ManualClock};
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(TimeDelta::seconds(2));
/// assert_eq!(clock.now(), start + TimeDelta::seconds(2));
/// ```
#[derive(Clone)]
pub struct ManualClock {
  now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
  /// Creates a clock frozen at `start`.
  pub fn new(start: DateTime<Utc>) -> Self {
    Self {
      now: Arc::new(Mutex::new(start)),
    }
  }

  /// Moves the clock by `delta`. Negative deltas move it backwards.
  ///
  /// Saturates at the representable bounds of `DateTime<Utc>`.
  pub fn advance(&self, delta: TimeDelta) {
    let mut now = self.now.lock();
    *now = saturating_add(*now, delta);
  }

  /// Jumps the clock to `instant`.
  pub fn set(&self, instant: DateTime<Utc>) {
    *self.now.lock() = instant;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock()
  }
}

impl fmt::Debug for ManualClock {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManualClock")
      .field("now", &*self.now.lock())
      .finish()
  }
}

/// Computes the absolute expiration of an entry written at `now` with `ttl`.
///
/// A zero TTL is treated as one nanosecond in the past so that it is already
/// expired at its write instant, even under a clock that does not move.
/// Saturates at the representable bounds rather than overflowing.
#[inline]
pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
  let ttl = if ttl.is_zero() {
    TimeDelta::nanoseconds(-1)
  } else {
    ttl
  };

  saturating_add(now, ttl)
}

#[inline]
fn saturating_add(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
  match at.checked_add_signed(delta) {
    Some(moved) => moved,
    None if delta < TimeDelta::zero() => DateTime::<Utc>::MIN_UTC,
    None => DateTime::<Utc>::MAX_UTC,
  }
}
