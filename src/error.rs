use std::{io, path::PathBuf};

use thiserror::Error;

/// Main error type for the malsync application.
///
/// Covers identifier validation, lock acquisition, duplicate resolution,
/// vault I/O, configuration, and serialization failures.
#[derive(Debug, Error)]
pub enum Error {
   /// I/O error occurred during file operations.
   #[error("io error: {0}")]
   Io(#[from] io::Error),

   /// An identifier failed the grammar check, either freshly generated from
   /// a record or supplied for validation.
   #[error(
      "malformed identifier {input:?}; expected mal:(anime|manga):<positive integer, no leading \
       zeros>"
   )]
   MalformedIdentifier { input: String },

   /// Lock for an identifier could not be acquired within the configured
   /// timeout.
   #[error(
      "timed out acquiring lock for {identifier} after {waited_ms} ms; another save for this \
       entry may be stuck, retry once it completes"
   )]
   LockTimeout { identifier: String, waited_ms: u64 },

   /// Duplicate resolution was invoked with an empty candidate list. Caller
   /// invariant violation: the index classified this identifier as having
   /// two or more documents.
   #[error("no candidate documents to resolve for {identifier}; this is a bug, please report it")]
   NoCandidates { identifier: String },

   /// Error occurred in the vault storage layer.
   #[error("vault error: {0}")]
   Vault(#[from] VaultError),

   /// Configuration-related error occurred.
   #[error("config error: {0}")]
   Config(#[from] figment::Error),

   /// JSON serialization or deserialization error occurred.
   #[error("json error: {0}")]
   Json(#[from] serde_json::Error),

   /// Error already reported to the user (e.g., styled output emitted).
   #[error("{message}")]
   Reported { message: String, exit_code: i32 },
}

impl Error {
   pub fn exit_code(&self) -> i32 {
      match self {
         Error::Reported { exit_code, .. } => *exit_code,
         Error::LockTimeout { .. } => 11,
         Error::MalformedIdentifier { .. } => 2,
         _ => 1,
      }
   }
}

/// Errors raised by the document storage layer.
#[derive(Debug, Error)]
pub enum VaultError {
   /// Failed to enumerate documents under the vault root.
   #[error("failed to list documents under {root}: {reason}", root = root.display())]
   List {
      root:   PathBuf,
      #[source]
      reason: io::Error,
   },

   /// Failed to read a document.
   #[error("failed to read {path}: {reason}", path = path.display())]
   Read {
      path:   PathBuf,
      #[source]
      reason: io::Error,
   },

   /// Failed to write a document.
   #[error("failed to write {path}: {reason}", path = path.display())]
   Write {
      path:   PathBuf,
      #[source]
      reason: io::Error,
   },

   /// Failed to create a folder.
   #[error("failed to create folder {path}: {reason}", path = path.display())]
   CreateFolder {
      path:   PathBuf,
      #[source]
      reason: io::Error,
   },

   /// A document's frontmatter block could not be parsed or re-serialized.
   #[error("invalid frontmatter in {path}: {reason}", path = path.display())]
   Frontmatter {
      path:   PathBuf,
      #[source]
      reason: serde_yaml::Error,
   },

   /// A mutation referenced a document that no longer exists.
   #[error("document not found: {path}", path = path.display())]
   NotFound { path: PathBuf },
}

/// Standard result type using [`enum@Error`] as the default error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
