use std::io;

use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The janitor was configured to run with a zero interval, which would
  /// turn it into a busy loop holding the cache's write lock.
  #[error("cleanup interval cannot be zero")]
  ZeroCleanupInterval,
  /// The OS refused to start the janitor thread.
  #[error("failed to spawn the janitor thread: {0}")]
  SpawnFailed(#[from] io::Error),
}
