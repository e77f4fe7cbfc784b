//! Identifier-indexed synchronization of remote media records into a
//! markdown vault.
//!
//! The pipeline is: parse records, build a just-in-time index over the
//! vault's frontmatter, plan skip decisions against remote timestamps, then
//! execute creates/updates/duplicate resolutions sequentially under
//! per-identifier locks.

pub mod cmd;
pub mod config;
pub mod error;
pub mod ident;
pub mod index;
pub mod lock;
pub mod ops;
pub mod plan;
pub mod sync;
pub mod types;
pub mod vault;

pub use error::{Error, Result};
