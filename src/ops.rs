//! Document operations: create, update-exact, resolve-duplicates.

use std::path::{Path, PathBuf};

use crate::{
   Result,
   error::Error,
   ident::Identifier,
   types::{ActionResult, MediaRecord, SyncAction},
   vault::{Document, MetaPatch, Vault, sanitize_file_base},
};

fn patch_for(record: &MediaRecord, identifier: &Identifier) -> MetaPatch {
   MetaPatch {
      media_id: identifier.as_str().to_string(),
      synced:   record.updated_at.clone(),
   }
}

/// Creates a new document for a record with no local match. Folder creation
/// and collision-avoiding naming are delegated to the vault.
pub async fn create_new<V: Vault + ?Sized>(
   vault: &V,
   record: &MediaRecord,
   identifier: &Identifier,
   folder: &Path,
) -> Result<ActionResult> {
   vault.ensure_folder(folder).await?;

   let base = sanitize_file_base(&record.title)
      .unwrap_or_else(|| identifier.as_str().replace(':', " "));
   let filename = vault.unique_name(folder, &base).await?;

   // Minimal body; the note is user territory from here on.
   let content = format!("# {}\n", record.title);
   let doc = vault
      .create_document(folder, &filename, &patch_for(record, identifier), &content)
      .await?;

   Ok(ActionResult {
      action:          SyncAction::Created,
      path:            doc.path,
      identifier:      identifier.clone(),
      duplicate_paths: Vec::new(),
      message:         None,
   })
}

/// Merges fresh metadata into the single matching document. User-authored
/// frontmatter and the note body survive untouched; only crate-owned keys
/// are patched.
pub async fn update_exact<V: Vault + ?Sized>(
   vault: &V,
   doc: &Document,
   record: &MediaRecord,
   identifier: &Identifier,
) -> Result<ActionResult> {
   vault.merge_metadata(doc, &patch_for(record, identifier)).await?;

   Ok(ActionResult {
      action:          SyncAction::Updated,
      path:            doc.path.clone(),
      identifier:      identifier.clone(),
      duplicate_paths: Vec::new(),
      message:         None,
   })
}

/// Resolves a duplicate group: the document with the latest modification
/// time becomes the update target (ties break toward the lexicographically
/// smallest path); the rest are reported but never modified or deleted.
pub async fn resolve_duplicates<V: Vault + ?Sized>(
   vault: &V,
   documents: &[Document],
   record: &MediaRecord,
   identifier: &Identifier,
) -> Result<ActionResult> {
   let winner = select_winner(documents).ok_or_else(|| Error::NoCandidates {
      identifier: identifier.to_string(),
   })?;

   vault.merge_metadata(winner, &patch_for(record, identifier)).await?;

   let mut duplicate_paths: Vec<PathBuf> = documents
      .iter()
      .filter(|doc| doc.path != winner.path)
      .map(|doc| doc.path.clone())
      .collect();
   duplicate_paths.sort();

   let message = format!(
      "{} documents share {identifier}; updated the most recently modified, the others were left \
       in place",
      documents.len()
   );

   Ok(ActionResult {
      action: SyncAction::DuplicatesDetected,
      path: winner.path.clone(),
      identifier: identifier.clone(),
      duplicate_paths,
      message: Some(message),
   })
}

/// Deterministic winner selection, independent of input order: latest
/// modification time, then smallest path.
fn select_winner(documents: &[Document]) -> Option<&Document> {
   documents.iter().reduce(|best, candidate| {
      match candidate.modified.cmp(&best.modified) {
         std::cmp::Ordering::Greater => candidate,
         std::cmp::Ordering::Less => best,
         std::cmp::Ordering::Equal if candidate.path < best.path => candidate,
         std::cmp::Ordering::Equal => best,
      }
   })
}
