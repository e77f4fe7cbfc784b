//! Per-identifier mutual exclusion with bounded acquisition.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::time;

use crate::{Result, error::Error, ident::Identifier};

/// Serializes save operations per identifier. Constructed once at startup
/// and handed by reference to every caller; a fresh instance per test gives
/// isolated lock state.
///
/// Saves for different identifiers proceed fully concurrently. A save that
/// cannot acquire its identifier's lock within the configured timeout fails
/// with [`Error::LockTimeout`] instead of waiting forever.
pub struct LockManager {
   timeout: Duration,
   locks:   Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LockManager {
   pub fn new(timeout: Duration) -> Self {
      Self { timeout, locks: Mutex::new(HashMap::new()) }
   }

   /// Runs `operation` while holding the lock for `identifier`. The lock is
   /// released when the operation completes, on both success and failure
   /// paths. Re-entrant acquisition from inside `operation` is not supported
   /// and will time out.
   pub async fn with_lock<T, F, Fut>(&self, identifier: &Identifier, operation: F) -> Result<T>
   where
      F: FnOnce() -> Fut,
      Fut: Future<Output = Result<T>>,
   {
      let lock = self.entry(identifier);
      let result = match time::timeout(self.timeout, lock.lock()).await {
         Ok(_guard) => operation().await,
         Err(_) => Err(Error::LockTimeout {
            identifier: identifier.to_string(),
            waited_ms:  self.timeout.as_millis() as u64,
         }),
      };

      self.prune(identifier, &lock);
      result
   }

   /// Drops the table entry when nobody else holds or awaits this lock, so
   /// the table tracks live contention instead of every identifier ever
   /// saved. Holding the table mutex makes the count check atomic against
   /// [`LockManager::entry`]: a racing caller either pins the entry with its
   /// own clone first, or re-creates a fresh one for the now-free lock.
   fn prune(&self, identifier: &Identifier, lock: &Arc<tokio::sync::Mutex<()>>) {
      let mut locks = self.locks.lock();
      // Two references mean the table's clone plus ours.
      if Arc::strong_count(lock) == 2 {
         locks.remove(identifier.as_str());
      }
   }

   /// Number of identifiers that currently have a lock entry.
   pub fn tracked(&self) -> usize {
      self.locks.lock().len()
   }

   fn entry(&self, identifier: &Identifier) -> Arc<tokio::sync::Mutex<()>> {
      let mut locks = self.locks.lock();
      Arc::clone(
         locks
            .entry(identifier.as_str().to_string())
            .or_default(),
      )
   }
}
