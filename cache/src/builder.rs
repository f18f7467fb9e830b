use crate::error::BuildError;
use crate::handles::TtlCache;
use crate::metrics::Metrics;
use crate::shared::CacheShared;
use crate::store::Store;
use crate::task::janitor::{Janitor, StopHandle};
use crate::time::{Clock, SystemClock};

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// How often the janitor sweeps when no interval is configured.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5);

/// A builder for creating `TtlCache` instances.
///
/// ```
/// use fibre_ttl::{TimeDelta, TtlCacheBuilder};
/// use std::time::Duration;
///
/// let (cache, janitor) = TtlCacheBuilder::<String, u32>::new()
///   .cleanup_interval(Duration::from_secs(30))
///   .build()
///   .unwrap();
///
/// cache.set("answer".to_string(), 42, TimeDelta::minutes(5));
/// assert_eq!(cache.get("answer"), (42, true));
///
/// janitor.stop();
/// ```
pub struct TtlCacheBuilder<K, V, H = ahash::RandomState> {
  clock: Option<Arc<dyn Clock>>,
  cleanup_interval: Duration,
  initial_capacity: usize,
  hasher: H,
  _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, H> fmt::Debug for TtlCacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TtlCacheBuilder")
      .field("cleanup_interval", &self.cleanup_interval)
      .field("initial_capacity", &self.initial_capacity)
      .field("has_custom_clock", &self.clock.is_some())
      .finish_non_exhaustive()
  }
}

// --- General Configuration Methods ---
impl<K, V, H> TtlCacheBuilder<K, V, H> {
  /// Replaces the system clock with `clock`.
  ///
  /// The cache reads this clock for every write, lookup and sweep, which makes
  /// expiry fully deterministic under a [`ManualClock`](crate::time::ManualClock).
  pub fn clock<C>(mut self, clock: C) -> Self
  where
    C: Clock,
  {
    self.clock = Some(Arc::new(clock));
    self
  }

  /// Sets how long the janitor waits between sweeps.
  ///
  /// Defaults to [`DEFAULT_CLEANUP_INTERVAL`] (5 seconds).
  pub fn cleanup_interval(mut self, interval: Duration) -> Self {
    self.cleanup_interval = interval;
    self
  }

  /// Pre-allocates room for `capacity` entries. This is not a limit.
  pub fn initial_capacity(mut self, capacity: usize) -> Self {
    self.initial_capacity = capacity;
    self
  }

  /// Sets the hasher for the cache's map.
  pub fn hasher<H2>(self, hasher: H2) -> TtlCacheBuilder<K, V, H2> {
    TtlCacheBuilder {
      clock: self.clock,
      cleanup_interval: self.cleanup_interval,
      initial_capacity: self.initial_capacity,
      hasher,
      _marker: PhantomData,
    }
  }
}

// --- Default Constructor ---
impl<K, V, H: BuildHasher + Default> TtlCacheBuilder<K, V, H> {
  /// Creates a new `TtlCacheBuilder` with default settings.
  pub fn new() -> Self {
    Self {
      clock: None,
      cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
      initial_capacity: 0,
      hasher: H::default(),
      _marker: PhantomData,
    }
  }
}

impl<K, V> Default for TtlCacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
// The janitor thread owns a handle to the shared core, which is what forces
// the `Send + Sync + 'static` bounds here.
impl<K, V, H> TtlCacheBuilder<K, V, H>
where
  K: Eq + Hash + Send + Sync + 'static,
  V: Send + Sync + 'static,
  H: BuildHasher + Send + Sync + 'static,
{
  /// Builds the cache and starts its janitor.
  ///
  /// Returns the cache together with the [`StopHandle`] for its janitor. The
  /// janitor runs until `stop` is called on that handle or every clone of the
  /// cache has been dropped.
  pub fn build(self) -> Result<(TtlCache<K, V, H>, StopHandle), BuildError> {
    self.validate()?;

    let shared = Arc::new(CacheShared {
      store: Store::with_capacity_and_hasher(self.initial_capacity, self.hasher),
      clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
      metrics: Metrics::new(),
    });

    let janitor = Janitor::spawn(Arc::downgrade(&shared), self.cleanup_interval)?;

    Ok((TtlCache { shared }, janitor.into_handle()))
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.cleanup_interval.is_zero() {
      return Err(BuildError::ZeroCleanupInterval);
    }
    Ok(())
  }
}
