use crate::entry::CacheEntry;

use core::fmt;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use chrono::{DateTime, Utc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The map type guarded by the store's lock.
pub(crate) type EntryMap<K, V, H> = HashMap<K, CacheEntry<V>, H>;

/// The single, coarsely locked map behind a cache.
///
/// Readers share the lock; writers, `clear` and the janitor take it
/// exclusively. Every sweep is a full scan, so per-key or per-shard locking
/// would buy nothing here.
pub(crate) struct Store<K, V, H> {
  map: RwLock<EntryMap<K, V, H>>,
}

impl<K, V, H> fmt::Debug for Store<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Store")
      .field("len", &self.map.read().len())
      .finish()
  }
}

impl<K, V, H> Store<K, V, H>
where
  H: BuildHasher,
{
  /// Creates an empty `Store` with room for `capacity` entries.
  pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
    Self {
      map: RwLock::new(HashMap::with_capacity_and_hasher(capacity, hasher)),
    }
  }

  /// Acquires the shared lock.
  #[inline]
  pub(crate) fn read(&self) -> RwLockReadGuard<'_, EntryMap<K, V, H>> {
    self.map.read()
  }

  /// Acquires the exclusive lock.
  #[inline]
  pub(crate) fn write(&self) -> RwLockWriteGuard<'_, EntryMap<K, V, H>> {
    self.map.write()
  }

  /// Swaps the live map for an empty one and hands back the old one.
  ///
  /// The caller drops the returned map after the lock has been released, so
  /// value destructors never run while other threads wait on the lock.
  pub(crate) fn take(&self) -> EntryMap<K, V, H>
  where
    H: Clone,
  {
    let mut guard = self.map.write();
    let fresh = HashMap::with_hasher(guard.hasher().clone());
    std::mem::replace(&mut *guard, fresh)
  }

  /// Moves every entry expired as of `now` out of the map.
  ///
  /// Like `take`, the removed entries are handed back so the caller can drop
  /// them once the lock is released. Live entries are reinserted under the
  /// same lock, so readers never see them missing.
  pub(crate) fn take_expired(&self, now: DateTime<Utc>) -> Vec<(K, CacheEntry<V>)>
  where
    K: Eq + Hash,
  {
    let mut guard = self.map.write();
    if !guard.values().any(|entry| entry.is_expired(now)) {
      return Vec::new();
    }

    let mut expired = Vec::new();
    let entries: Vec<_> = guard.drain().collect();
    for (key, entry) in entries {
      if entry.is_expired(now) {
        expired.push((key, entry));
      } else {
        guard.insert(key, entry);
      }
    }
    expired
  }
}
