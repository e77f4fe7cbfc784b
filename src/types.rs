//! Shared record, result, and planning types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ident::Identifier, vault::Document};

/// Category of a remote media entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
   Anime,
   Manga,
}

impl MediaCategory {
   pub const fn as_lowercase_str(self) -> &'static str {
      match self {
         Self::Anime => "anime",
         Self::Manga => "manga",
      }
   }
}

/// A remote media entry as supplied by the record source. Immutable for the
/// duration of one sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
   pub id:       i64,
   pub category: MediaCategory,
   pub title:    String,
   /// Last remote modification, ISO-8601, as reported by the remote source.
   #[serde(rename = "updatedAt", default)]
   pub updated_at: Option<String>,
}

/// Outcome of querying the index for one identifier. Every query classifies
/// into exactly one of these.
#[derive(Debug, Clone)]
pub enum Lookup {
   /// No document carries the identifier; a new one must be created.
   None,
   /// Exactly one document carries the identifier; update it in place.
   Exact(Document),
   /// Two or more documents carry the identifier (always >= 2 entries).
   Duplicates(Vec<Document>),
}

/// What a save operation did to the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
   Created,
   Updated,
   DuplicatesDetected,
   Skipped,
}

/// Result of saving one record
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
   pub action:     SyncAction,
   pub path:       PathBuf,
   pub identifier: Identifier,
   #[serde(skip_serializing_if = "Vec::is_empty", default)]
   pub duplicate_paths: Vec<PathBuf>,
   #[serde(skip_serializing_if = "Option::is_none", default)]
   pub message:    Option<String>,
}

/// Per-record planning artifact: computed during the planning pass, consumed
/// during execution, then discarded.
#[derive(Debug)]
pub struct BatchItem {
   pub record: MediaRecord,
   pub plan:   ItemPlan,
}

/// Routing decision for one planned record
#[derive(Debug)]
pub enum ItemPlan {
   /// Identifier generation failed; logged and omitted from results.
   Invalid { error: crate::Error },
   /// Local and remote state already match; synthesize a skip result with
   /// zero I/O.
   Skip {
      identifier: Identifier,
      path:       Option<PathBuf>,
      reason:     String,
   },
   /// A write is required; routed by the lookup outcome.
   Process { identifier: Identifier, lookup: Lookup },
}

/// Per-call options for save operations
#[derive(Debug, Clone)]
pub struct SaveOptions {
   /// Vault-relative folder that receives newly created documents.
   pub folder: PathBuf,
   /// When set, planner skip decisions are bypassed and every record is
   /// re-processed.
   pub force:  bool,
}

/// Progress snapshot reported after each processed (non-skipped) item
#[derive(Debug, Clone)]
pub struct SyncProgress {
   pub processed: usize,
   pub total:     usize,
   pub current:   Option<String>,
}
