//! Just-in-time identifier index over vault documents.
//!
//! Built fresh per logical operation from one metadata scan, read-only once
//! built, and discarded afterwards. A document written after the build will
//! not appear changed to later lookups against the same index.

use std::collections::HashMap;

use crate::{
   Result,
   ident::Identifier,
   types::Lookup,
   vault::{Document, Vault},
};

/// Ephemeral mapping from identifier to the documents carrying it, in
/// discovery order.
pub struct VaultIndex {
   entries: HashMap<String, Vec<Document>>,
}

impl VaultIndex {
   /// Enumerates every document and groups those with a valid identifier.
   /// Documents without an identifier are excluded silently; documents with
   /// a malformed stored identifier are excluded and logged as a
   /// data-quality signal. Only the enumeration itself can fail.
   pub async fn build<V: Vault + ?Sized>(vault: &V) -> Result<Self> {
      let documents = vault.list_documents().await?;
      let mut entries: HashMap<String, Vec<Document>> = HashMap::new();

      for doc in documents {
         let Some(meta) = vault.cached_metadata(&doc) else {
            continue;
         };
         let Some(raw) = meta.media_id else {
            continue;
         };
         if !Identifier::validate_format(&raw) {
            tracing::warn!(
               path = %doc.path.display(),
               media_id = %raw,
               "document carries a malformed identifier, excluding from index"
            );
            continue;
         }
         entries.entry(raw).or_default().push(doc);
      }

      Ok(Self { entries })
   }

   /// Classifies the documents matching `identifier` by cardinality.
   pub fn lookup(&self, identifier: &Identifier) -> Lookup {
      match self.entries.get(identifier.as_str()).map(Vec::as_slice) {
         None | Some([]) => Lookup::None,
         Some([only]) => Lookup::Exact(only.clone()),
         Some(many) => Lookup::Duplicates(many.to_vec()),
      }
   }

   /// Number of distinct identifiers present in the vault.
   pub fn len(&self) -> usize {
      self.entries.len()
   }

   pub fn is_empty(&self) -> bool {
      self.entries.is_empty()
   }

   /// Total documents indexed across all identifiers.
   pub fn document_count(&self) -> usize {
      self.entries.values().map(Vec::len).sum()
   }
}
