//! Document storage abstraction with a local markdown implementation.

pub(crate) mod local;

use std::{collections::BTreeMap, path::Path, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

pub use local::LocalVault;

/// Frontmatter key carrying the canonical identifier.
pub const META_KEY_ID: &str = "media_id";
/// Frontmatter key mirroring the remote `updatedAt` at last write.
pub const META_KEY_SYNCED: &str = "synced";

/// A persisted, addressable unit of storage: one note file in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
   /// Path relative to the vault root, unique within it.
   pub path:     PathBuf,
   /// Host-provided last-write timestamp.
   pub modified: DateTime<Utc>,
}

/// Cached frontmatter for one document. Served from memory; reading it must
/// not touch disk.
#[derive(Debug, Clone, Default)]
pub struct DocMeta {
   /// Raw identifier string as stored, if the document was ever synced.
   /// Validation happens at index-build time, not here.
   pub media_id: Option<String>,
   /// Remote `updatedAt` mirrored at the time of last write.
   pub synced:   Option<String>,
   /// User-owned keys; preserved verbatim on every merge.
   pub extra:    BTreeMap<String, serde_yaml::Value>,
}

/// Metadata written by a save operation. Applied additively: keys outside
/// this patch are never removed or rewritten.
#[derive(Debug, Clone)]
pub struct MetaPatch {
   pub media_id: String,
   pub synced:   Option<String>,
}

/// Storage collaborator contract. The engine decides *what* operation to
/// request; the vault owns physical file lifecycle.
#[async_trait]
pub trait Vault: Send + Sync {
   /// Enumerates every document under the storage root and fills the
   /// metadata cache in the same pass.
   async fn list_documents(&self) -> Result<Vec<Document>>;

   /// Cached frontmatter for a previously listed document. O(1), no disk
   /// access. `None` when the document was not seen by the last enumeration.
   fn cached_metadata(&self, doc: &Document) -> Option<DocMeta>;

   /// Creates a new document with initial metadata and content. The caller
   /// supplies a collision-free filename obtained from [`Vault::unique_name`].
   async fn create_document(
      &self,
      folder: &Path,
      filename: &str,
      meta: &MetaPatch,
      content: &str,
   ) -> Result<Document>;

   /// Merges a metadata patch into an existing document's frontmatter.
   /// User-authored frontmatter keys and the note body are preserved.
   async fn merge_metadata(&self, doc: &Document, patch: &MetaPatch) -> Result<()>;

   /// Returns a filename (with extension) under `folder` that does not
   /// collide with an existing file, derived from `base`.
   async fn unique_name(&self, folder: &Path, base: &str) -> Result<String>;

   /// Creates `folder` (and intermediate segments) if missing. Idempotent.
   async fn ensure_folder(&self, folder: &Path) -> Result<()>;
}

/// Strips characters that are hostile to file paths from a title, collapsing
/// whitespace runs. Returns `None` when nothing usable remains.
pub fn sanitize_file_base(title: &str) -> Option<String> {
   let cleaned: String = title
      .chars()
      .map(|c| match c {
         '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
         c if c.is_control() => ' ',
         c => c,
      })
      .collect();
   let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
   (!collapsed.is_empty()).then_some(collapsed)
}
