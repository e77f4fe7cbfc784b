//! Two-phase batch synchronization engine.
//!
//! Planning (in-memory, one index build for the whole batch) is fully
//! decoupled from execution (sequential writes in input order), so skip
//! decisions are cheap and no write invalidates a decision already made for
//! another item in the same run.

use std::sync::Arc;

use indicatif::ProgressBar;

use crate::{
   Result,
   index::VaultIndex,
   lock::LockManager,
   ops,
   plan,
   types::{ActionResult, BatchItem, ItemPlan, Lookup, MediaRecord, SaveOptions, SyncAction,
           SyncProgress},
   vault::Vault,
};

/// How many processed items between cooperative yields back to the
/// scheduler. Keeps a long batch from starving whatever else shares the
/// runtime; tunable via config.
pub const DEFAULT_YIELD_EVERY: usize = 10;

/// Engine for synchronizing remote media records into a vault
pub struct SyncEngine<V: Vault> {
   vault:       V,
   locks:       Arc<LockManager>,
   yield_every: usize,
}

/// Result summary from a batch run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
   pub created:    usize,
   pub updated:    usize,
   pub skipped:    usize,
   pub duplicates: usize,
   pub failed:     usize,
}

impl SyncSummary {
   pub fn tally(results: &[ActionResult], input_len: usize) -> Self {
      let mut summary = Self::default();
      for result in results {
         match result.action {
            SyncAction::Created => summary.created += 1,
            SyncAction::Updated => summary.updated += 1,
            SyncAction::Skipped => summary.skipped += 1,
            SyncAction::DuplicatesDetected => summary.duplicates += 1,
         }
      }
      summary.failed = input_len.saturating_sub(results.len());
      summary
   }
}

/// Trait for receiving sync progress updates
pub trait SyncProgressCallback: Send {
   fn progress(&mut self, progress: SyncProgress);
}

impl<F: FnMut(SyncProgress) + Send> SyncProgressCallback for F {
   fn progress(&mut self, progress: SyncProgress) {
      self(progress);
   }
}

impl SyncProgressCallback for () {
   fn progress(&mut self, _progress: SyncProgress) {}
}

impl SyncProgressCallback for ProgressBar {
   fn progress(&mut self, progress: SyncProgress) {
      self.update(|state| {
         state.set_len(progress.total as u64);
         state.set_pos(progress.processed as u64);
      });
      if let Some(title) = &progress.current {
         self.set_message(title.clone());
      }
   }
}

impl<V: Vault> SyncEngine<V> {
   pub fn new(vault: V, locks: Arc<LockManager>) -> Self {
      Self { vault, locks, yield_every: DEFAULT_YIELD_EVERY }
   }

   pub fn with_yield_every(mut self, yield_every: usize) -> Self {
      self.yield_every = yield_every.max(1);
      self
   }

   pub fn vault(&self) -> &V {
      &self.vault
   }

   /// Saves a single record under its identifier's lock. The index is
   /// rebuilt immediately before use, because any earlier snapshot may be
   /// stale; the lock keeps a concurrent save for the same identifier from
   /// racing between that build and the write.
   pub async fn save_one(
      &self,
      record: MediaRecord,
      options: &SaveOptions,
   ) -> Result<ActionResult> {
      let identifier = crate::ident::Identifier::generate(&record)?;

      self
         .locks
         .with_lock(&identifier, || async {
            let index = VaultIndex::build(&self.vault).await?;
            let item = plan::prepare_one(record, &index, &self.vault, options);
            self.execute_item(item, options).await
         })
         .await
   }

   /// Saves a batch of records through the two-phase pipeline: one index
   /// build, full planning, zero-cost skip synthesis, then sequential
   /// execution in input order.
   ///
   /// Individual item failures are logged and omitted from the results; a
   /// failure to build the index aborts the whole batch, since no partial
   /// index is trustworthy. Items are not individually lock-protected:
   /// execution is sequential within the run, and the per-identifier lock
   /// only matters for saves that race this batch through
   /// [`SyncEngine::save_one`].
   pub async fn save_batch(
      &self,
      records: Vec<MediaRecord>,
      options: &SaveOptions,
      callback: &mut dyn SyncProgressCallback,
   ) -> Result<Vec<ActionResult>> {
      let total = records.len();
      tracing::debug!(total, force = options.force, "starting batch sync");

      // Indexing: one scan amortized across every record in the batch.
      let index = VaultIndex::build(&self.vault).await?;

      // Planning: all skip decisions land before any write executes.
      let items = plan::prepare(records, &index, &self.vault, options);

      let (skips, work): (Vec<_>, Vec<_>) = items
         .into_iter()
         .partition(|item| matches!(item.plan, ItemPlan::Skip { .. }));

      // Fast skip: synthesize results with zero I/O.
      let mut results: Vec<ActionResult> = skips
         .into_iter()
         .filter_map(|item| match item.plan {
            ItemPlan::Skip { identifier, path, reason } => Some(ActionResult {
               action:          SyncAction::Skipped,
               path:            path.unwrap_or_default(),
               identifier,
               duplicate_paths: Vec::new(),
               message:         Some(reason),
            }),
            _ => None,
         })
         .collect();
      let skipped = results.len();

      let mut processed = 0usize;
      for item in work {
         let title = item.record.title.clone();
         match self.execute_item(item, options).await {
            Ok(result) => results.push(result),
            Err(err) => {
               tracing::warn!(title = %title, "failed to save record: {err}");
            },
         }

         processed += 1;
         callback.progress(SyncProgress {
            processed: skipped + processed,
            total,
            current: Some(title),
         });

         // Cooperative yield so the host stays responsive during long runs.
         if processed % self.yield_every == 0 {
            tokio::task::yield_now().await;
         }
      }

      tracing::debug!(
         total,
         skipped,
         written = results.len() - skipped,
         "batch sync finished"
      );
      Ok(results)
   }

   async fn execute_item(
      &self,
      item: BatchItem,
      options: &SaveOptions,
   ) -> Result<ActionResult> {
      let BatchItem { record, plan } = item;
      match plan {
         ItemPlan::Invalid { error } => Err(error),
         ItemPlan::Skip { identifier, path, reason } => Ok(ActionResult {
            action:          SyncAction::Skipped,
            path:            path.unwrap_or_default(),
            identifier,
            duplicate_paths: Vec::new(),
            message:         Some(reason),
         }),
         ItemPlan::Process { identifier, lookup } => match lookup {
            Lookup::None => {
               ops::create_new(&self.vault, &record, &identifier, &options.folder).await
            },
            Lookup::Exact(doc) => {
               ops::update_exact(&self.vault, &doc, &record, &identifier).await
            },
            Lookup::Duplicates(docs) => {
               ops::resolve_duplicates(&self.vault, &docs, &record, &identifier).await
            },
         },
      }
   }
}
