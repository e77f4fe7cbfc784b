mod support;

use std::{path::PathBuf, sync::Arc, time::Duration};

use malsync::{
   Error,
   error::VaultError,
   lock::LockManager,
   sync::{SyncEngine, SyncSummary},
   types::{SaveOptions, SyncAction, SyncProgress},
   vault::{LocalVault, Vault},
};
use parking_lot::Mutex;
use support::{MemoryVault, anime};
use tempfile::TempDir;

fn options() -> SaveOptions {
   SaveOptions { folder: PathBuf::from("Media"), force: false }
}

fn locks() -> Arc<LockManager> {
   Arc::new(LockManager::new(Duration::from_secs(5)))
}

#[tokio::test]
async fn create_then_skip_then_update_against_real_vault() {
   let dir = TempDir::new().expect("temp vault");
   let record = anime(1245, "Vision of Escaflowne", Some("2024-01-15T10:30:00Z"));

   let engine = SyncEngine::new(LocalVault::new(dir.path()), locks());

   // First run: nothing local, so the record materializes as a new note.
   let results = engine
      .save_batch(vec![record.clone()], &options(), &mut ())
      .await
      .expect("first sync");
   assert_eq!(results.len(), 1);
   assert_eq!(results[0].action, SyncAction::Created);
   assert_eq!(results[0].path, PathBuf::from("Media/Vision of Escaflowne.md"));
   assert!(dir.path().join("Media/Vision of Escaflowne.md").is_file());

   // Second run with an unchanged timestamp: pure skip, no write.
   let results = engine
      .save_batch(vec![record.clone()], &options(), &mut ())
      .await
      .expect("second sync");
   assert_eq!(results[0].action, SyncAction::Skipped);

   // Remote moved on: the same note is updated in place.
   let newer = anime(1245, "Vision of Escaflowne", Some("2024-03-01T08:00:00Z"));
   let results = engine
      .save_batch(vec![newer], &options(), &mut ())
      .await
      .expect("third sync");
   assert_eq!(results[0].action, SyncAction::Updated);
   assert_eq!(results[0].path, PathBuf::from("Media/Vision of Escaflowne.md"));

   let docs = engine.vault().list_documents().await.expect("list");
   assert_eq!(docs.len(), 1);
   let meta = engine.vault().cached_metadata(&docs[0]).expect("meta");
   assert_eq!(meta.media_id.as_deref(), Some("mal:anime:1245"));
   assert_eq!(meta.synced.as_deref(), Some("2024-03-01T08:00:00Z"));
}

#[tokio::test]
async fn failed_enumeration_aborts_the_whole_batch() {
   let dir = TempDir::new().expect("temp vault");
   let missing = dir.path().join("gone");
   let engine = SyncEngine::new(LocalVault::new(missing.clone()), locks());

   let seen = Mutex::new(Vec::new());
   let mut callback = |p: SyncProgress| seen.lock().push(p.processed);

   // Index build fails before planning, so nothing is written and no
   // progress is ever reported.
   let err = engine
      .save_batch(
         vec![anime(1, "Never Written", Some("2024-01-01T00:00:00Z"))],
         &options(),
         &mut callback,
      )
      .await
      .unwrap_err();

   assert!(matches!(err, Error::Vault(VaultError::List { .. })), "got {err}");
   assert!(!missing.exists(), "batch must not create anything after a failed scan");
   assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn batch_creates_every_record_and_reports_progress() {
   let vault = MemoryVault::new();
   let engine = SyncEngine::new(vault, locks());

   let records: Vec<_> = (1..=25)
      .map(|id| anime(id, &format!("Series {id}"), Some("2024-01-01T00:00:00Z")))
      .collect();

   let seen = Mutex::new(Vec::new());
   let mut callback = |p: SyncProgress| seen.lock().push(p.processed);

   let results = engine
      .save_batch(records, &options(), &mut callback)
      .await
      .expect("batch sync");

   assert_eq!(results.len(), 25);
   assert!(results.iter().all(|r| r.action == SyncAction::Created));
   assert_eq!(engine.vault().note_count(), 25);

   let seen = seen.lock();
   assert_eq!(seen.len(), 25);
   assert_eq!(*seen.last().unwrap(), 25);

   let summary = SyncSummary::tally(&results, 25);
   assert_eq!(summary.created, 25);
   assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn duplicates_update_latest_and_report_the_rest() {
   let vault = MemoryVault::new();
   // Seed order fixes modified times: newer.md is the most recent writer.
   vault.seed("Media/older.md", Some("mal:anime:7"), Some("2023-01-01T00:00:00Z"));
   vault.seed("Media/newer.md", Some("mal:anime:7"), Some("2023-01-01T00:00:00Z"));
   let engine = SyncEngine::new(vault, locks());

   let results = engine
      .save_batch(
         vec![anime(7, "Duplicated", Some("2024-06-01T00:00:00Z"))],
         &options(),
         &mut (),
      )
      .await
      .expect("sync");

   assert_eq!(results.len(), 1);
   assert_eq!(results[0].action, SyncAction::DuplicatesDetected);
   assert_eq!(results[0].path, PathBuf::from("Media/newer.md"));
   assert_eq!(results[0].duplicate_paths, vec![PathBuf::from("Media/older.md")]);

   let winner = engine.vault().meta_of("Media/newer.md").expect("winner meta");
   assert_eq!(winner.synced.as_deref(), Some("2024-06-01T00:00:00Z"));
   let loser = engine.vault().meta_of("Media/older.md").expect("loser meta");
   assert_eq!(loser.synced.as_deref(), Some("2023-01-01T00:00:00Z"));
}

#[tokio::test]
async fn update_preserves_user_frontmatter_and_body() {
   let dir = TempDir::new().expect("temp vault");
   let media = dir.path().join("Media");
   std::fs::create_dir_all(&media).expect("media folder");
   std::fs::write(
      media.join("Monster.md"),
      "---\nmedia_id: mal:anime:19\nsynced: \"2023-05-05T00:00:00Z\"\nrating: 10\n---\n# Monster\n\nJohan is terrifying.\n",
   )
   .expect("seed note");

   let engine = SyncEngine::new(LocalVault::new(dir.path()), locks());
   let results = engine
      .save_batch(
         vec![anime(19, "Monster", Some("2024-05-05T00:00:00Z"))],
         &options(),
         &mut (),
      )
      .await
      .expect("sync");
   assert_eq!(results[0].action, SyncAction::Updated);

   let content = std::fs::read_to_string(media.join("Monster.md")).expect("read back");
   assert!(content.contains("rating: 10"), "user key lost:\n{content}");
   assert!(content.contains("Johan is terrifying."), "body lost:\n{content}");
   assert!(content.contains("2024-05-05T00:00:00Z"), "synced not updated:\n{content}");
}

#[tokio::test]
async fn identical_titles_get_distinct_filenames() {
   let vault = MemoryVault::new();
   let engine = SyncEngine::new(vault, locks());

   let results = engine
      .save_batch(
         vec![
            anime(1, "Ghost in the Shell", Some("2024-01-01T00:00:00Z")),
            anime(2, "Ghost in the Shell", Some("2024-01-01T00:00:00Z")),
         ],
         &options(),
         &mut (),
      )
      .await
      .expect("sync");

   assert_eq!(results.len(), 2);
   assert!(results.iter().all(|r| r.action == SyncAction::Created));
   assert_eq!(results[0].path, PathBuf::from("Media/Ghost in the Shell.md"));
   assert_eq!(results[1].path, PathBuf::from("Media/Ghost in the Shell (1).md"));
}

#[tokio::test]
async fn invalid_records_are_logged_and_omitted() {
   let vault = MemoryVault::new();
   let engine = SyncEngine::new(vault, locks());

   let results = engine
      .save_batch(
         vec![
            anime(0, "Bad Id", Some("2024-01-01T00:00:00Z")),
            anime(5, "Good Id", Some("2024-01-01T00:00:00Z")),
         ],
         &options(),
         &mut (),
      )
      .await
      .expect("sync");

   assert_eq!(results.len(), 1);
   assert_eq!(results[0].identifier.as_str(), "mal:anime:5");

   let summary = SyncSummary::tally(&results, 2);
   assert_eq!(summary.created, 1);
   assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn save_one_skips_until_forced() {
   let vault = MemoryVault::new();
   let engine = SyncEngine::new(vault, locks());
   let record = anime(42, "Hunter x Hunter", Some("2024-02-02T00:00:00Z"));

   let created = engine.save_one(record.clone(), &options()).await.expect("create");
   assert_eq!(created.action, SyncAction::Created);

   let skipped = engine.save_one(record.clone(), &options()).await.expect("skip");
   assert_eq!(skipped.action, SyncAction::Skipped);

   let forced = SaveOptions { force: true, ..options() };
   let updated = engine.save_one(record, &forced).await.expect("force");
   assert_eq!(updated.action, SyncAction::Updated);
   assert_eq!(engine.vault().note_count(), 1);
}
