//! Batch planning: state resolution and skip decisions, no I/O.

use chrono::{DateTime, Utc};

use crate::{
   ident::Identifier,
   index::VaultIndex,
   types::{BatchItem, ItemPlan, Lookup, MediaRecord, SaveOptions},
   vault::Vault,
};

/// Outcome of the pure skip decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDecision {
   pub skip:   bool,
   pub reason: String,
}

/// Decides whether a record's write can be skipped. Skips only when force is
/// off, both timestamps are present and parseable, and they name the exact
/// same instant. Every other combination re-processes: missing an update is
/// worse than a redundant write.
///
/// Pure function of its inputs; no ordering dependence across records.
pub fn should_skip(local: Option<&str>, remote: Option<&str>, force: bool) -> SkipDecision {
   if force {
      return SkipDecision { skip: false, reason: "force sync requested".to_string() };
   }
   let Some(local) = local else {
      return SkipDecision { skip: false, reason: "no local synced timestamp".to_string() };
   };
   let Some(remote) = remote else {
      return SkipDecision { skip: false, reason: "no remote updatedAt timestamp".to_string() };
   };
   let (Some(local_at), Some(remote_at)) = (parse_instant(local), parse_instant(remote)) else {
      return SkipDecision { skip: false, reason: "unparseable timestamp".to_string() };
   };
   if local_at == remote_at {
      SkipDecision { skip: true, reason: "local state matches remote updatedAt".to_string() }
   } else {
      SkipDecision { skip: false, reason: "remote updatedAt differs from local state".to_string() }
   }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
   DateTime::parse_from_rfc3339(s)
      .ok()
      .map(|t| t.with_timezone(&Utc))
}

/// Computes a routing plan for every record against one index snapshot.
///
/// Two passes: state resolution (identifier, lookup, cached local synced
/// timestamp) and skip decision. Output order matches input order; records
/// are neither reordered nor deduplicated. The only I/O is the metadata
/// cache read, which is served from memory.
pub fn prepare<V: Vault + ?Sized>(
   records: Vec<MediaRecord>,
   index: &VaultIndex,
   vault: &V,
   options: &SaveOptions,
) -> Vec<BatchItem> {
   records
      .into_iter()
      .map(|record| prepare_one(record, index, vault, options))
      .collect()
}

/// Plans a single record. Used directly by the single-item save path.
pub fn prepare_one<V: Vault + ?Sized>(
   record: MediaRecord,
   index: &VaultIndex,
   vault: &V,
   options: &SaveOptions,
) -> BatchItem {
   let plan = plan_record(&record, index, vault, options);
   BatchItem { record, plan }
}

fn plan_record<V: Vault + ?Sized>(
   record: &MediaRecord,
   index: &VaultIndex,
   vault: &V,
   options: &SaveOptions,
) -> ItemPlan {
   let identifier = match Identifier::generate(record) {
      Ok(identifier) => identifier,
      Err(error) => return ItemPlan::Invalid { error },
   };

   let lookup = index.lookup(&identifier);

   // The cached synced timestamp only matters for an exact match: a missing
   // document has nothing to compare and duplicates always need resolution.
   let local_synced = match &lookup {
      Lookup::Exact(doc) => vault.cached_metadata(doc).and_then(|meta| meta.synced),
      Lookup::None | Lookup::Duplicates(_) => None,
   };

   let decision = match &lookup {
      Lookup::Exact(_) => {
         should_skip(local_synced.as_deref(), record.updated_at.as_deref(), options.force)
      },
      Lookup::None | Lookup::Duplicates(_) => SkipDecision {
         skip:   false,
         reason: "no exact local match".to_string(),
      },
   };

   if decision.skip {
      let path = match &lookup {
         Lookup::Exact(doc) => Some(doc.path.clone()),
         Lookup::None | Lookup::Duplicates(_) => None,
      };
      tracing::debug!(identifier = %identifier, reason = %decision.reason, "skipping record");
      ItemPlan::Skip { identifier, path, reason: decision.reason }
   } else {
      ItemPlan::Process { identifier, lookup }
   }
}
