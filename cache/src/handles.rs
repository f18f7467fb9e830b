use crate::builder::TtlCacheBuilder;
use crate::entry::CacheEntry;
use crate::iter::Keys;
use crate::lookup::Lookup;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::shared::CacheShared;
use crate::task::janitor::StopHandle;

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

/// A thread-safe, in-process cache where every entry expires.
///
/// Cloning a `TtlCache` is cheap and yields another handle onto the same
/// map. All operations are synchronous and hold the cache's lock only for
/// the map access itself.
///
/// Expired entries are never returned as usable: lookups compare each
/// entry's expiry with the cache's clock at call time. They are not removed
/// by lookups either; the janitor started alongside the cache removes them
/// on its interval, and [`sweep`](TtlCache::sweep) does the same on demand.
pub struct TtlCache<K, V, H = ahash::RandomState> {
  pub(crate) shared: Arc<CacheShared<K, V, H>>,
}

impl<K, V, H> Clone for TtlCache<K, V, H> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<K, V, H> fmt::Debug for TtlCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TtlCache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<K, V> TtlCache<K, V>
where
  K: Eq + Hash + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Creates a cache on the system clock with the default cleanup interval,
  /// together with the handle that stops its janitor.
  ///
  /// # Panics
  ///
  /// Panics if the OS refuses to spawn the janitor thread, as
  /// `std::thread::spawn` does. Use [`TtlCache::builder`] to handle that case.
  pub fn new() -> (Self, StopHandle) {
    match TtlCacheBuilder::new().build() {
      Ok(built) => built,
      Err(err) => panic!("fibre_ttl: {err}"),
    }
  }
}

impl<K, V> TtlCache<K, V> {
  /// Returns a builder with default settings.
  pub fn builder() -> TtlCacheBuilder<K, V> {
    TtlCacheBuilder::default()
  }
}

impl<K, V, H> TtlCache<K, V, H>
where
  K: Eq + Hash,
  H: BuildHasher,
{
  /// Stores `value` under `key`, expiring `ttl` after the clock's current time.
  ///
  /// Any existing entry for `key` is replaced wholesale. A zero or negative
  /// `ttl` stores an entry that is already expired.
  pub fn set(&self, key: K, value: V, ttl: TimeDelta) {
    let entry = CacheEntry::new(value, self.shared.now(), ttl);

    let previous = {
      let mut guard = self.shared.store.write();
      guard.insert(key, entry)
    };

    if previous.is_some() {
      Metrics::bump(&self.shared.metrics.updates);
    } else {
      Metrics::bump(&self.shared.metrics.inserts);
    }
  }

  /// Looks up `key`, reporting whether its entry is fresh, expired or missing.
  ///
  /// Expiry is judged against the clock at call time. An expired entry is
  /// left in place for the janitor.
  pub fn lookup<Q>(&self, key: &Q) -> Lookup<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    V: Clone,
  {
    let now = self.shared.now();

    let result = {
      let guard = self.shared.store.read();
      match guard.get(key) {
        Some(entry) if entry.is_expired(now) => Lookup::Expired(entry.value().clone()),
        Some(entry) => Lookup::Fresh(entry.value().clone()),
        None => Lookup::Missing,
      }
    };

    let metrics = &self.shared.metrics;
    match &result {
      Lookup::Fresh(_) => Metrics::bump(&metrics.hits),
      Lookup::Expired(_) => {
        Metrics::bump(&metrics.misses);
        Metrics::bump(&metrics.stale_hits);
      }
      Lookup::Missing => Metrics::bump(&metrics.misses),
    }

    result
  }

  /// Retrieves the value for `key` as a `(value, found)` pair.
  ///
  /// - Missing key: `(V::default(), false)`.
  /// - Expired entry: the stored value with `found == false`. The value is
  ///   stale and must not be used as if it were live.
  /// - Live entry: `(value, true)`.
  pub fn get<Q>(&self, key: &Q) -> (V, bool)
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    V: Clone + Default,
  {
    self.lookup(key).into_pair()
  }

  /// Removes `key`, returning `true` if it was present (expired or not).
  /// Removing an absent key is a no-op.
  pub fn delete<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let removed = self.shared.store.write().remove(key);

    if removed.is_some() {
      Metrics::bump(&self.shared.metrics.deletes);
      true
    } else {
      false
    }
  }

  /// Returns `true` if `key` is in the map, even if its entry has expired.
  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.shared.store.read().contains_key(key)
  }

  /// Returns the absolute expiry of the entry for `key`, if it is in the map.
  pub fn expires_at<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.shared.store.read().get(key).map(CacheEntry::expires_at)
  }

  /// Returns the number of entries in the map, including expired entries the
  /// janitor has not removed yet.
  pub fn len(&self) -> usize {
    self.shared.store.read().len()
  }

  /// Returns `true` if the map holds no entries at all.
  pub fn is_empty(&self) -> bool {
    self.shared.store.read().is_empty()
  }

  /// Removes all entries by swapping in an empty map.
  pub fn clear(&self)
  where
    H: Clone,
  {
    let old = self.shared.store.take();
    Metrics::bump(&self.shared.metrics.clears);
    drop(old);
  }

  /// Returns a snapshot of every key currently in the map, in no particular
  /// order. Keys of expired but unswept entries are included.
  pub fn keys(&self) -> Keys<K>
  where
    K: Clone,
  {
    let keys = self.shared.store.read().keys().cloned().collect();
    Keys::new(keys)
  }

  /// Runs one sweep on the calling thread, removing every entry that has
  /// expired. Returns the number of entries removed.
  ///
  /// This is the same pass the janitor runs on its interval, and it keeps
  /// working after the janitor has been stopped.
  pub fn sweep(&self) -> usize {
    self.shared.sweep()
  }

  /// Returns a snapshot of the cache's counters.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
