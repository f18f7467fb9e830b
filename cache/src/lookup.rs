/// The outcome of looking a key up in a `TtlCache`.
///
/// An expired entry still carries its last value. Callers that only want
/// usable values should match on `Fresh` or call [`Lookup::fresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
  /// The key is present and its entry has not expired.
  Fresh(V),
  /// The key is present but its entry has expired and is awaiting a sweep.
  Expired(V),
  /// The key is not present.
  Missing,
}

impl<V> Lookup<V> {
  /// Returns `true` for `Lookup::Fresh`.
  #[inline]
  pub fn is_fresh(&self) -> bool {
    matches!(self, Lookup::Fresh(_))
  }

  /// Returns the value only if it is usable.
  #[inline]
  pub fn fresh(self) -> Option<V> {
    match self {
      Lookup::Fresh(value) => Some(value),
      Lookup::Expired(_) | Lookup::Missing => None,
    }
  }

  /// Returns whatever value the cache held, fresh or stale.
  #[inline]
  pub fn stored(self) -> Option<V> {
    match self {
      Lookup::Fresh(value) | Lookup::Expired(value) => Some(value),
      Lookup::Missing => None,
    }
  }

  /// Flattens the lookup into a `(value, found)` pair.
  ///
  /// `found` is `true` only for a fresh entry. A stale entry yields its
  /// stored value with `found == false`; a missing key yields `V::default()`.
  pub fn into_pair(self) -> (V, bool)
  where
    V: Default,
  {
    match self {
      Lookup::Fresh(value) => (value, true),
      Lookup::Expired(value) => (value, false),
      Lookup::Missing => (V::default(), false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn into_pair_keeps_stale_value() {
    assert_eq!(Lookup::Fresh(3).into_pair(), (3, true));
    assert_eq!(Lookup::Expired(3).into_pair(), (3, false));
    assert_eq!(Lookup::<i32>::Missing.into_pair(), (0, false));
  }

  #[test]
  fn fresh_drops_stale_value() {
    assert_eq!(Lookup::Expired("old").fresh(), None);
    assert_eq!(Lookup::Expired("old").stored(), Some("old"));
    assert!(!Lookup::<()>::Missing.is_fresh());
  }
}
