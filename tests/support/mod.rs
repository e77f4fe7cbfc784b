#![allow(dead_code)]

use std::{
   collections::HashMap,
   path::{Path, PathBuf},
   sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use malsync::{
   error::VaultError,
   types::{MediaCategory, MediaRecord},
   vault::{DocMeta, Document, MetaPatch, Vault},
};
use parking_lot::Mutex;

pub fn anime(id: i64, title: &str, updated_at: Option<&str>) -> MediaRecord {
   MediaRecord {
      id,
      category: MediaCategory::Anime,
      title: title.to_string(),
      updated_at: updated_at.map(ToString::to_string),
   }
}

struct Note {
   meta:     DocMeta,
   body:     String,
   modified: DateTime<Utc>,
}

/// In-memory vault double. Mutations bump a logical clock so modified times
/// are strictly ordered within a test.
pub struct MemoryVault {
   notes: Mutex<HashMap<PathBuf, Note>>,
   clock: AtomicI64,
}

impl MemoryVault {
   pub fn new() -> Self {
      Self { notes: Mutex::new(HashMap::new()), clock: AtomicI64::new(0) }
   }

   fn tick(&self) -> DateTime<Utc> {
      let t = self.clock.fetch_add(1, Ordering::SeqCst);
      Utc.timestamp_opt(1_700_000_000 + t, 0).unwrap()
   }

   /// Seeds a note as if a previous sync (or the user) had written it.
   pub fn seed(&self, path: &str, media_id: Option<&str>, synced: Option<&str>) {
      let meta = DocMeta {
         media_id: media_id.map(ToString::to_string),
         synced:   synced.map(ToString::to_string),
         extra:    Default::default(),
      };
      let modified = self.tick();
      self.notes.lock().insert(
         PathBuf::from(path),
         Note { meta, body: String::new(), modified },
      );
   }

   pub fn body_of(&self, path: &str) -> Option<String> {
      self.notes.lock().get(Path::new(path)).map(|n| n.body.clone())
   }

   pub fn meta_of(&self, path: &str) -> Option<DocMeta> {
      self.notes.lock().get(Path::new(path)).map(|n| n.meta.clone())
   }

   pub fn note_count(&self) -> usize {
      self.notes.lock().len()
   }
}

#[async_trait]
impl Vault for MemoryVault {
   async fn list_documents(&self) -> malsync::Result<Vec<Document>> {
      let notes = self.notes.lock();
      let mut documents: Vec<Document> = notes
         .iter()
         .map(|(path, note)| Document { path: path.clone(), modified: note.modified })
         .collect();
      documents.sort_by(|a, b| a.path.cmp(&b.path));
      Ok(documents)
   }

   fn cached_metadata(&self, doc: &Document) -> Option<DocMeta> {
      self.notes.lock().get(&doc.path).map(|n| n.meta.clone())
   }

   async fn create_document(
      &self,
      folder: &Path,
      filename: &str,
      meta: &MetaPatch,
      content: &str,
   ) -> malsync::Result<Document> {
      let path = folder.join(filename);
      let modified = self.tick();
      self.notes.lock().insert(path.clone(), Note {
         meta:     DocMeta {
            media_id: Some(meta.media_id.clone()),
            synced:   meta.synced.clone(),
            extra:    Default::default(),
         },
         body:     content.to_string(),
         modified,
      });
      Ok(Document { path, modified })
   }

   async fn merge_metadata(&self, doc: &Document, patch: &MetaPatch) -> malsync::Result<()> {
      let modified = self.tick();
      let mut notes = self.notes.lock();
      let note = notes
         .get_mut(&doc.path)
         .ok_or_else(|| VaultError::NotFound { path: doc.path.clone() })?;
      note.meta.media_id = Some(patch.media_id.clone());
      if let Some(synced) = &patch.synced {
         note.meta.synced = Some(synced.clone());
      }
      note.modified = modified;
      Ok(())
   }

   async fn unique_name(&self, folder: &Path, base: &str) -> malsync::Result<String> {
      let notes = self.notes.lock();
      let mut candidate = format!("{base}.md");
      let mut counter = 1usize;
      while notes.contains_key(&folder.join(&candidate)) {
         candidate = format!("{base} ({counter}).md");
         counter += 1;
      }
      Ok(candidate)
   }

   async fn ensure_folder(&self, _folder: &Path) -> malsync::Result<()> {
      Ok(())
   }
}
