//! Sync command: push a file of remote records into a vault.

use std::{path::PathBuf, sync::Arc};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
   Result, config,
   lock::LockManager,
   sync::{SyncEngine, SyncSummary},
   types::{MediaRecord, SaveOptions},
   vault::LocalVault,
};

/// Executes the sync command.
pub async fn execute(
   records: PathBuf,
   vault_root: PathBuf,
   folder: Option<String>,
   force: bool,
   json: bool,
) -> Result<()> {
   let cfg = config::init_for_vault(&vault_root);

   let raw = tokio::fs::read_to_string(&records).await?;
   let records: Vec<MediaRecord> = serde_json::from_str(&raw)?;
   let total = records.len();

   let options = SaveOptions {
      folder: PathBuf::from(folder.unwrap_or_else(|| cfg.media_folder.clone())),
      force,
   };

   let vault = LocalVault::new(vault_root);
   let locks = Arc::new(LockManager::new(cfg.lock_timeout()));
   let engine = SyncEngine::new(vault, locks).with_yield_every(cfg.yield_every);

   let results = if json {
      engine.save_batch(records, &options, &mut ()).await?
   } else {
      let mut pb = ProgressBar::new(total as u64);
      pb.set_style(
         ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .unwrap()
            .progress_chars("█▓░"),
      );
      pb.set_message("Syncing records...");

      let results = engine.save_batch(records, &options, &mut pb).await?;
      pb.finish_and_clear();
      results
   };

   let summary = SyncSummary::tally(&results, total);

   if json {
      println!("{}", serde_json::to_string_pretty(&results)?);
      return Ok(());
   }

   println!(
      "{}",
      style(format!(
         "Sync complete (created={}, updated={}, skipped={}, duplicates={})",
         summary.created, summary.updated, summary.skipped, summary.duplicates
      ))
      .green()
   );
   if summary.failed > 0 {
      println!(
         "{}",
         style(format!("{} record(s) failed; see warnings above", summary.failed)).yellow()
      );
   }

   Ok(())
}
