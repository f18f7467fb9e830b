//! A concurrent, in-process key-value cache where every entry expires.
//!
//! # Features
//! - **Per-entry TTL**: each `set` carries its own time-to-live. Zero and
//!   negative TTLs are accepted and produce entries that are already expired.
//! - **Never stale on read**: lookups check expiry against the cache's clock
//!   at call time and report expired entries as not found.
//! - **Active reclamation**: a janitor thread sweeps expired entries on a
//!   fixed interval, so memory is reclaimed even for keys nobody reads again.
//! - **Injectable clock**: swap the wall clock for a [`time::ManualClock`] (or
//!   any closure) to test expiry deterministically.
//!
//! # Example
//!
//! ```
//! use fibre_ttl::{TimeDelta, TtlCache};
//! use std::time::Duration;
//!
//! let (cache, janitor) = TtlCache::<&str, i32>::builder()
//!   .cleanup_interval(Duration::from_millis(50))
//!   .build()
//!   .unwrap();
//!
//! cache.set("a", 1, TimeDelta::seconds(1));
//! assert_eq!(cache.get("a"), (1, true));
//!
//! // A non-positive TTL stores an entry that is already expired. The stale
//! // value is still handed back, flagged as not found.
//! cache.set("b", 2, TimeDelta::seconds(-1));
//! assert_eq!(cache.get("b"), (2, false));
//!
//! janitor.stop();
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod iter;
pub mod lookup;
pub mod metrics;
pub mod time;

// Internal, crate-only modules
mod entry;
mod shared;
mod store;
mod task;

// Re-export the primary user-facing types for convenience
pub use builder::{TtlCacheBuilder, DEFAULT_CLEANUP_INTERVAL};
pub use error::BuildError;
pub use handles::TtlCache;
pub use iter::Keys;
pub use lookup::Lookup;
pub use metrics::MetricsSnapshot;
pub use task::janitor::StopHandle;
pub use time::{Clock, ManualClock, SystemClock};

pub use chrono::{DateTime, TimeDelta, Utc};
