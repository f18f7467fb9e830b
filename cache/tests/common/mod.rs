#![allow(dead_code)]

use std::time::Duration;

use fibre_ttl::{DateTime, ManualClock, StopHandle, TtlCache, TtlCacheBuilder, Utc};

use chrono::TimeZone;

/// A janitor interval short enough to observe several sweeps in a test.
pub const JANITOR_TICK: Duration = Duration::from_millis(50);

/// Enough time for at least one full janitor tick to land, with margin for
/// a loaded CI machine.
pub const SWEEP_WAIT: Duration = Duration::from_millis(250);

pub fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

/// Builds a cache on a frozen clock at `t0()`, returning the clock so the
/// test can move time by hand.
pub fn build_manual_cache<K, V>(
  cleanup_interval: Duration,
) -> (TtlCache<K, V>, StopHandle, ManualClock)
where
  K: Eq + std::hash::Hash + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  let clock = ManualClock::new(t0());
  let (cache, janitor) = TtlCacheBuilder::new()
    .clock(clock.clone())
    .cleanup_interval(cleanup_interval)
    .build()
    .unwrap();
  (cache, janitor, clock)
}

/// Builds a cache on a frozen clock whose janitor is too slow to interfere.
pub fn build_quiet_cache<K, V>() -> (TtlCache<K, V>, StopHandle, ManualClock)
where
  K: Eq + std::hash::Hash + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  build_manual_cache(Duration::from_secs(3600))
}
