use crate::shared::CacheShared;

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

const JANITOR_THREAD_NAME: &str = "fibre-ttl-janitor";

/// State shared between the janitor thread and every `StopHandle`.
#[derive(Default)]
struct JanitorControl {
  /// Set once, never cleared. The janitor holds this lock while it sweeps,
  /// so once `stop` has returned no further sweep can begin.
  stopped: Mutex<bool>,
  /// Mirrors `stopped` for queries that must not wait out a sweep.
  stop_requested: AtomicBool,
  wakeup: Condvar,
  thread: Mutex<Option<JoinHandle<()>>>,
}

/// The background task that periodically removes expired entries.
pub(crate) struct Janitor {
  control: Arc<JanitorControl>,
}

impl Janitor {
  /// Spawns a new janitor thread sweeping `shared` every `interval`.
  ///
  /// The thread only holds a weak reference to the cache, and exits on its
  /// next wake-up once the cache has been dropped.
  pub(crate) fn spawn<K, V, H>(
    shared: Weak<CacheShared<K, V, H>>,
    interval: Duration,
  ) -> io::Result<Self>
  where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    H: BuildHasher + Send + Sync + 'static,
  {
    let control = Arc::new(JanitorControl::default());
    let thread_control = Arc::clone(&control);

    let handle = thread::Builder::new()
      .name(JANITOR_THREAD_NAME.to_string())
      .spawn(move || Self::run(&thread_control, &shared, interval))?;

    *control.thread.lock() = Some(handle);
    Ok(Self { control })
  }

  /// The janitor's main loop.
  fn run<K, V, H>(control: &JanitorControl, shared: &Weak<CacheShared<K, V, H>>, interval: Duration)
  where
    K: Eq + Hash,
    H: BuildHasher,
  {
    tracing::debug!(interval_ms = interval.as_millis() as u64, "janitor started");

    let mut stopped = control.stopped.lock();
    loop {
      // Sleep for one interval, or until `stop` wakes us.
      match Instant::now().checked_add(interval) {
        Some(deadline) => {
          while !*stopped {
            if control.wakeup.wait_until(&mut stopped, deadline).timed_out() {
              break;
            }
          }
        }
        None => {
          while !*stopped {
            control.wakeup.wait(&mut stopped);
          }
        }
      }

      if *stopped {
        tracing::debug!("janitor stopped");
        break;
      }

      let Some(shared) = shared.upgrade() else {
        tracing::debug!("cache dropped, janitor exiting");
        break;
      };
      shared.sweep();
    }
  }

  pub(crate) fn into_handle(self) -> StopHandle {
    StopHandle {
      control: self.control,
    }
  }
}

/// The handle that stops a cache's janitor.
///
/// Returned by [`TtlCacheBuilder::build`](crate::TtlCacheBuilder::build)
/// next to the cache. Stopping is terminal: the janitor cannot be restarted,
/// but the cache itself keeps working and [`TtlCache::sweep`](crate::TtlCache::sweep)
/// can still be called by hand.
///
/// Dropping the handle does **not** stop the janitor. It still exits on its
/// own once every clone of the cache has been dropped.
#[derive(Clone)]
pub struct StopHandle {
  control: Arc<JanitorControl>,
}

impl StopHandle {
  /// Signals the janitor to stop and wakes it immediately.
  ///
  /// If a sweep is running, this waits for it to finish. Once `stop` returns
  /// no further sweep will start. Calling it again is a no-op.
  pub fn stop(&self) {
    let mut stopped = self.control.stopped.lock();
    if !*stopped {
      *stopped = true;
      self.control.stop_requested.store(true, Ordering::Release);
      self.control.wakeup.notify_all();
      tracing::debug!("janitor stop requested");
    }
  }

  /// Stops the janitor and waits for its thread to exit.
  pub fn join(&self) {
    self.stop();

    let handle = self.control.thread.lock().take();
    if let Some(handle) = handle {
      if handle.join().is_err() {
        tracing::warn!("janitor thread panicked");
      }
    }
  }

  /// Returns `true` once `stop` has been called on any clone of this handle.
  ///
  /// Never waits for a sweep in progress.
  pub fn is_stopped(&self) -> bool {
    self.control.stop_requested.load(Ordering::Acquire)
  }
}

impl fmt::Debug for StopHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StopHandle")
      .field("stopped", &self.is_stopped())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use crate::time::{Clock, ManualClock};
  use crate::TtlCacheBuilder;

  use chrono::{DateTime, TimeDelta, TimeZone, Utc};
  use parking_lot::{Condvar, Mutex};
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{mpsc, Arc};
  use std::thread;
  use std::time::{Duration, Instant};

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
  }

  fn manual_clock() -> ManualClock {
    ManualClock::new(t0())
  }

  /// A clock that, once armed, parks every caller until it is released.
  #[derive(Default)]
  struct Gate {
    armed: AtomicBool,
    entered: AtomicBool,
    released: Mutex<bool>,
    open: Condvar,
  }

  #[derive(Clone, Default)]
  struct GatedClock(Arc<Gate>);

  impl GatedClock {
    fn release(&self) {
      self.0.armed.store(false, Ordering::SeqCst);
      *self.0.released.lock() = true;
      self.0.open.notify_all();
    }
  }

  impl Clock for GatedClock {
    fn now(&self) -> DateTime<Utc> {
      if self.0.armed.load(Ordering::SeqCst) {
        self.0.entered.store(true, Ordering::SeqCst);
        let mut released = self.0.released.lock();
        while !*released {
          self.0.open.wait(&mut released);
        }
      }
      t0()
    }
  }

  #[test]
  fn stop_wakes_janitor_without_waiting_out_the_interval() {
    let (_cache, janitor) = TtlCacheBuilder::<u32, u32>::new()
      .cleanup_interval(Duration::from_secs(3600))
      .build()
      .unwrap();

    let started = Instant::now();
    janitor.join();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(janitor.is_stopped());
  }

  #[test]
  fn stop_is_idempotent_across_clones() {
    let (_cache, janitor) = TtlCacheBuilder::<u32, u32>::new().build().unwrap();
    let other = janitor.clone();

    janitor.stop();
    other.stop();
    other.join();
    janitor.join();
    assert!(other.is_stopped());
  }

  #[test]
  fn janitor_exits_once_cache_is_dropped() {
    let (cache, janitor) = TtlCacheBuilder::<u32, u32>::new()
      .clock(manual_clock())
      .cleanup_interval(Duration::from_millis(10))
      .build()
      .unwrap();

    cache.set(1, 1, TimeDelta::seconds(1));
    drop(cache);
    thread::sleep(Duration::from_millis(200));

    let finished = janitor
      .control
      .thread
      .lock()
      .as_ref()
      .map(|handle| handle.is_finished());
    assert_eq!(finished, Some(true));
    assert!(!janitor.is_stopped());
  }

  #[test]
  fn is_stopped_does_not_wait_for_a_running_sweep() {
    let clock = GatedClock::default();
    let (_cache, janitor) = TtlCacheBuilder::<u32, u32>::new()
      .clock(clock.clone())
      .cleanup_interval(Duration::from_millis(10))
      .build()
      .unwrap();

    clock.0.armed.store(true, Ordering::SeqCst);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !clock.0.entered.load(Ordering::SeqCst) && Instant::now() < deadline {
      thread::sleep(Duration::from_millis(5));
    }
    assert!(clock.0.entered.load(Ordering::SeqCst), "janitor never started a sweep");

    // The janitor is now parked inside a sweep.
    let (tx, rx) = mpsc::channel();
    let query = janitor.clone();
    thread::spawn(move || {
      let _ = tx.send((query.is_stopped(), format!("{query:?}")));
    });
    let answer = rx.recv_timeout(Duration::from_secs(1));

    clock.release();
    janitor.join();

    let (stopped, debug) = answer.expect("is_stopped blocked behind the sweep");
    assert!(!stopped);
    assert!(debug.contains("stopped: false"));
  }

  #[test]
  fn no_sweeps_after_stop() {
    let clock = manual_clock();
    let (cache, janitor) = TtlCacheBuilder::<u32, u32>::new()
      .clock(clock.clone())
      .cleanup_interval(Duration::from_millis(10))
      .build()
      .unwrap();

    janitor.join();
    let sweeps_at_stop = cache.metrics().sweeps;

    cache.set(1, 1, TimeDelta::seconds(1));
    clock.advance(TimeDelta::seconds(2));
    thread::sleep(Duration::from_millis(100));

    assert_eq!(cache.metrics().sweeps, sweeps_at_stop);
    assert_eq!(cache.len(), 1);
  }
}
