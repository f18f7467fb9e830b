//! Contains the snapshot iterator over a cache's keys.

use std::fmt;
use std::iter::FusedIterator;
use std::vec;

/// A point-in-time snapshot of the keys in a `TtlCache`.
///
/// Created by [`TtlCache::keys`](crate::TtlCache::keys). The keys are copied
/// out under the read lock when the snapshot is taken; after that the
/// iterator is detached from the cache and never blocks it. The snapshot
/// includes keys whose entries have expired but have not been swept yet.
///
/// Order is unspecified. The iterator can be consumed exactly once.
pub struct Keys<K> {
  inner: vec::IntoIter<K>,
}

impl<K> Keys<K> {
  pub(crate) fn new(keys: Vec<K>) -> Self {
    Self {
      inner: keys.into_iter(),
    }
  }
}

impl<K> Iterator for Keys<K> {
  type Item = K;

  #[inline]
  fn next(&mut self) -> Option<K> {
    self.inner.next()
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    self.inner.size_hint()
  }
}

impl<K> ExactSizeIterator for Keys<K> {}

impl<K> FusedIterator for Keys<K> {}

impl<K: fmt::Debug> fmt::Debug for Keys<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.inner.as_slice()).finish()
  }
}
