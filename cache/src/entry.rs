use chrono::{DateTime, TimeDelta, Utc};

use crate::time;

/// A container for a value in the cache, paired with its absolute expiry.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
  /// The user's value. Never handed out by reference; reads clone it.
  value: V,
  /// The instant after which this entry counts as expired.
  expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
  /// Creates a new `CacheEntry` written at `now` that lives for `ttl`.
  ///
  /// A zero or negative `ttl` yields an entry that is already expired at `now`.
  pub(crate) fn new(value: V, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
    Self {
      value,
      expires_at: time::expiry_after(now, ttl),
    }
  }

  #[inline]
  pub(crate) fn value(&self) -> &V {
    &self.value
  }

  #[inline]
  pub(crate) fn expires_at(&self) -> DateTime<Utc> {
    self.expires_at
  }

  /// Checks if the entry is expired as of `now`.
  #[inline]
  pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
    is_expired(self.expires_at, now)
  }
}

/// The expiration predicate shared by lookups and sweeps.
///
/// An entry is expired only once `now` is strictly after its expiry, so an
/// entry read at the exact instant it expires is still fresh.
#[inline]
pub(crate) fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
  now > expires_at
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
  }

  #[test]
  fn test_entry_not_expired() {
    let entry = CacheEntry::new("test_value", t0(), TimeDelta::seconds(60));

    assert_eq!(*entry.value(), "test_value");
    assert_eq!(entry.expires_at(), t0() + TimeDelta::seconds(60));
    assert!(!entry.is_expired(t0()));
    assert!(!entry.is_expired(t0() + TimeDelta::seconds(59)));
  }

  #[test]
  fn test_entry_expired() {
    let entry = CacheEntry::new(1, t0(), TimeDelta::seconds(1));
    assert!(entry.is_expired(t0() + TimeDelta::seconds(2)));
  }

  #[test]
  fn test_expiry_boundary_is_strict() {
    let entry = CacheEntry::new(1, t0(), TimeDelta::seconds(1));
    let deadline = t0() + TimeDelta::seconds(1);

    assert!(!entry.is_expired(deadline));
    assert!(entry.is_expired(deadline + TimeDelta::nanoseconds(1)));
  }

  #[test]
  fn test_zero_ttl_is_expired_at_write_instant() {
    let entry = CacheEntry::new(1, t0(), TimeDelta::zero());
    assert!(entry.is_expired(t0()));
  }

  #[test]
  fn test_negative_ttl_is_expired_immediately() {
    let entry = CacheEntry::new(1, t0(), TimeDelta::hours(-2));
    assert!(entry.is_expired(t0()));
  }
}
