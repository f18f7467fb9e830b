use crate::metrics::Metrics;
use crate::store::Store;
use crate::time::Clock;

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// The internal, thread-safe core of the cache.
///
/// Handles hold it strongly; the janitor only holds a `Weak` to it, so the
/// map is freed as soon as the last handle goes away.
pub(crate) struct CacheShared<K, V, H> {
  pub(crate) store: Store<K, V, H>,
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) metrics: Metrics,
}

impl<K, V, H> fmt::Debug for CacheShared<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("store", &self.store)
      .field("metrics", &self.metrics.snapshot())
      .finish_non_exhaustive()
  }
}

impl<K, V, H> CacheShared<K, V, H>
where
  K: Eq + Hash,
  H: BuildHasher,
{
  #[inline]
  pub(crate) fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  /// Removes every entry that is expired as of a single reading of the clock.
  ///
  /// Holds the exclusive lock for the whole scan, but drops the removed keys
  /// and values only after releasing it. Returns how many entries were
  /// removed.
  pub(crate) fn sweep(&self) -> usize {
    let now = self.now();

    let expired = self.store.take_expired(now);
    let removed = expired.len();
    drop(expired);
    let remaining = self.store.read().len();

    Metrics::bump(&self.metrics.sweeps);
    if removed > 0 {
      self
        .metrics
        .swept
        .fetch_add(removed as u64, Ordering::Relaxed);
    }

    tracing::trace!(removed, remaining, "swept expired entries");
    removed
  }
}
