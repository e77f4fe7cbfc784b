//! Canonical identifier codec linking remote records to vault documents.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
   Result,
   error::Error,
   types::{MediaCategory, MediaRecord},
};

/// Fixed provider token; every identifier this crate emits starts with it.
pub const PROVIDER: &str = "mal";

fn identifier_regex() -> &'static Regex {
   static ONCE: OnceLock<Regex> = OnceLock::new();
   ONCE.get_or_init(|| {
      // Positive integer, no leading zeros.
      Regex::new(r"^mal:(anime|manga):[1-9][0-9]*$").unwrap()
   })
}

/// A validated `provider:category:id` identifier.
///
/// Construction goes through [`Identifier::generate`] or
/// [`Identifier::parse`], so holding one implies the grammar check passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
   /// Tests a string against the identifier grammar. Pure and total.
   pub fn validate_format(s: &str) -> bool {
      identifier_regex().is_match(s)
   }

   /// Composes the identifier for a record, then re-validates its own
   /// output. The re-check catches ids that the record type alone cannot
   /// exclude (zero or negative).
   pub fn generate(record: &MediaRecord) -> Result<Self> {
      let composed = format!("{PROVIDER}:{}:{}", record.category.as_lowercase_str(), record.id);
      if !Self::validate_format(&composed) {
         return Err(Error::MalformedIdentifier { input: composed });
      }
      Ok(Self(composed))
   }

   /// Accepts an already-composed identifier string if it matches the
   /// grammar. Used when reading identifiers back out of document metadata.
   pub fn parse(s: &str) -> Option<Self> {
      Self::validate_format(s).then(|| Self(s.to_string()))
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }

   /// The category segment of the identifier.
   pub fn category(&self) -> MediaCategory {
      match self.0.split(':').nth(1) {
         Some("manga") => MediaCategory::Manga,
         _ => MediaCategory::Anime,
      }
   }
}

impl fmt::Display for Identifier {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.0)
   }
}
